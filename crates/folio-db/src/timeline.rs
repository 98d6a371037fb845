use crate::types::{TimelineItem, TimelineParams, TimelineRow};
use sqlx::PgPool;
use uuid::Uuid;

const TIMELINE_COLUMNS: &str =
    "id, date, title, description, file_url, file_name, file_type, created_at";

/// List all timeline items, newest date first
pub async fn list(pool: &PgPool) -> Result<Vec<TimelineItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TimelineRow>(&format!(
        "SELECT {TIMELINE_COLUMNS} FROM timeline_items ORDER BY date DESC, created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(TimelineItem::from).collect())
}

/// Get a single timeline item by ID
pub async fn get(pool: &PgPool, id: &str) -> Result<Option<TimelineItem>, sqlx::Error> {
    let row = sqlx::query_as::<_, TimelineRow>(&format!(
        "SELECT {TIMELINE_COLUMNS} FROM timeline_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(TimelineItem::from))
}

/// Insert a timeline item with a fresh ID
pub async fn create(pool: &PgPool, p: &TimelineParams) -> Result<TimelineItem, sqlx::Error> {
    let (file_url, file_name, file_type) = attachment_columns(p);
    let row = sqlx::query_as::<_, TimelineRow>(&format!(
        r#"
        INSERT INTO timeline_items (
            id, date, title, description, file_url, file_name, file_type, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        RETURNING {TIMELINE_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(p.date)
    .bind(&p.title)
    .bind(&p.description)
    .bind(file_url)
    .bind(file_name)
    .bind(file_type)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Replace every mutable field of a timeline item
pub async fn update(
    pool: &PgPool,
    id: &str,
    p: &TimelineParams,
) -> Result<Option<TimelineItem>, sqlx::Error> {
    let (file_url, file_name, file_type) = attachment_columns(p);
    let row = sqlx::query_as::<_, TimelineRow>(&format!(
        r#"
        UPDATE timeline_items SET
            date = $2,
            title = $3,
            description = $4,
            file_url = $5,
            file_name = $6,
            file_type = $7
        WHERE id = $1
        RETURNING {TIMELINE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(p.date)
    .bind(&p.title)
    .bind(&p.description)
    .bind(file_url)
    .bind(file_name)
    .bind(file_type)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(TimelineItem::from))
}

/// Delete a timeline item, returning whether a row was removed
pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM timeline_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

type AttachmentColumns<'a> = (Option<&'a str>, Option<&'a str>, Option<&'static str>);

fn attachment_columns(p: &TimelineParams) -> AttachmentColumns<'_> {
    match &p.attachment {
        Some(a) => (
            Some(a.url.as_str()),
            Some(a.original_name.as_str()),
            Some(a.kind.as_str()),
        ),
        None => (None, None, None),
    }
}
