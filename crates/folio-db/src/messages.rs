use crate::types::{CreateMessageParams, Message};
use sqlx::PgPool;
use uuid::Uuid;

/// List all messages, most recent first
pub async fn list(pool: &PgPool) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, name, email, message, created_at, read
        FROM messages
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Get a single message by ID
pub async fn get(pool: &PgPool, id: &str) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        "SELECT id, name, email, message, created_at, read FROM messages WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Store a visitor message as unread
pub async fn create(pool: &PgPool, p: &CreateMessageParams) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (id, name, email, message, created_at, read)
        VALUES ($1, $2, $3, $4, NOW(), FALSE)
        RETURNING id, name, email, message, created_at, read
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&p.name)
    .bind(&p.email)
    .bind(&p.message)
    .fetch_one(pool)
    .await
}

/// Set only the read flag of a message
pub async fn set_read(
    pool: &PgPool,
    id: &str,
    read: bool,
) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        UPDATE messages SET read = $2
        WHERE id = $1
        RETURNING id, name, email, message, created_at, read
        "#,
    )
    .bind(id)
    .bind(read)
    .fetch_optional(pool)
    .await
}

/// Delete a message, returning whether a row was removed
pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
