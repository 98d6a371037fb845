use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use folio_db::{Attachment, FileKind, TimelineItem, TimelineParams};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use ts_rs::TS;

use crate::constants::{
    DOCUMENTS_CONTAINER, IMAGES_CONTAINER, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};
use crate::error::AppError;
use crate::state::AppState;

/// File sent inline with a timeline write
#[derive(Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FileUpload {
    name: String,
    content_type: String,
    /// Base64-encoded file content
    data: String,
}

#[derive(Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TimelineRequest {
    /// `YYYY-MM-DD` or RFC 3339 timestamp
    date: String,
    title: String,
    #[serde(default)]
    description: String,
    #[ts(optional)]
    file: Option<FileUpload>,
    /// On update, drop the current attachment when no new file is sent
    #[serde(default)]
    remove_file: bool,
}

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let items = state.timeline.list_all().await?;
    Ok(Json(items.as_slice()).into_response())
}

pub async fn get_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Response, AppError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Date must be formatted as YYYY-MM-DD".into()))?;

    match state.timeline.get_by_date(date).await? {
        Some(item) => Ok(Json(item.as_ref()).into_response()),
        None => Err(AppError::NotFound(format!("No timeline item on {date}"))),
    }
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TimelineItem>, AppError> {
    state
        .timeline
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<TimelineRequest>,
) -> Result<(StatusCode, Json<TimelineItem>), AppError> {
    let (date, title, description) = validate(&body)?;

    let uploaded = match &body.file {
        Some(file) => Some(upload(&state, file).await?),
        None => None,
    };

    let params = TimelineParams {
        date,
        title,
        description,
        attachment: uploaded.clone(),
    };
    let item = match state.timeline.create(&params).await {
        Ok(item) => item,
        Err(e) => {
            discard_upload(&state, uploaded.as_ref()).await;
            return Err(e.into());
        }
    };

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TimelineRequest>,
) -> Result<Json<TimelineItem>, AppError> {
    let (date, title, description) = validate(&body)?;

    let existing = state.timeline.get_by_id(&id).await?.ok_or_else(not_found)?;

    let uploaded = match &body.file {
        Some(file) => Some(upload(&state, file).await?),
        None => None,
    };
    let attachment = match &uploaded {
        Some(new) => Some(new.clone()),
        None if body.remove_file => None,
        None => existing.attachment.clone(),
    };

    let params = TimelineParams {
        date,
        title,
        description,
        attachment,
    };
    let item = match state.timeline.update(&id, &params).await {
        Ok(Some(item)) => item,
        // Deleted concurrently or the write failed: the new blob has no owner
        result => {
            discard_upload(&state, uploaded.as_ref()).await;
            return Err(match result {
                Err(e) => e.into(),
                _ => not_found(),
            });
        }
    };

    if let Some(old) = &existing.attachment {
        if item.attachment.as_ref().map(|a| &a.url) != Some(&old.url) {
            remove_blob(&state, old).await;
        }
    }

    Ok(Json(item))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let item = state.timeline.delete(&id).await?.ok_or_else(not_found)?;

    if let Some(attachment) = &item.attachment {
        remove_blob(&state, attachment).await;
    }

    Ok(Json(json!({ "success": true })))
}

fn not_found() -> AppError {
    AppError::NotFound("Timeline item not found".into())
}

fn validate(body: &TimelineRequest) -> Result<(DateTime<Utc>, String, String), AppError> {
    let date = parse_date(&body.date).ok_or_else(|| {
        AppError::BadRequest("Date must be YYYY-MM-DD or an RFC 3339 timestamp".into())
    })?;

    let title = body.title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Title must be 1-{MAX_TITLE_LENGTH} characters"
        )));
    }

    let description = body.description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }

    Ok((date, title.to_string(), description.to_string()))
}

/// Parse a plain date (midnight UTC) or a full timestamp
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn kind_for(content_type: &str) -> Option<FileKind> {
    let content_type = content_type.trim().to_ascii_lowercase();
    if content_type.starts_with("image/") {
        Some(FileKind::Image)
    } else if content_type.starts_with("text/") {
        Some(FileKind::Text)
    } else {
        None
    }
}

pub(crate) fn container_for(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Image => IMAGES_CONTAINER,
        FileKind::Text => DOCUMENTS_CONTAINER,
    }
}

async fn upload(state: &AppState, file: &FileUpload) -> Result<Attachment, AppError> {
    let kind = kind_for(&file.content_type).ok_or_else(|| {
        AppError::BadRequest("Only image and text attachments are supported".into())
    })?;

    let data = STANDARD
        .decode(file.data.trim())
        .map_err(|_| AppError::BadRequest("File data must be base64-encoded".into()))?;

    let stored = state
        .blobs
        .upload(container_for(kind), &file.name, &data, &file.content_type)
        .await?;

    Ok(Attachment {
        url: stored.url,
        original_name: file.name.clone(),
        kind,
    })
}

async fn discard_upload(state: &AppState, uploaded: Option<&Attachment>) {
    if let Some(attachment) = uploaded {
        remove_blob(state, attachment).await;
    }
}

/// Best effort: the record is already gone or replaced
async fn remove_blob(state: &AppState, attachment: &Attachment) {
    let container = container_for(attachment.kind);
    let name = attachment.blob_name();
    if let Err(e) = state.blobs.delete(container, name).await {
        warn!(container, name, error = %e, "Failed to delete attachment blob");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use crate::routes::test_support::{body_bytes, body_json, send, test_app, TestApp};
    use axum::http::Method;

    fn entry(date: &str, title: &str) -> Value {
        json!({ "date": date, "title": title, "description": "Details" })
    }

    #[test]
    fn test_parse_date_formats() {
        let plain = parse_date("2024-03-01").unwrap();
        assert_eq!(plain.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let stamped = parse_date("2024-03-01T23:30:00+02:00").unwrap();
        assert_eq!(stamped.to_rfc3339(), "2024-03-01T21:30:00+00:00");

        assert!(parse_date("03/01/2024").is_none());
    }

    #[test]
    fn test_kind_for_content_type() {
        assert_eq!(kind_for("image/png"), Some(FileKind::Image));
        assert_eq!(kind_for("Text/Markdown"), Some(FileKind::Text));
        assert_eq!(kind_for("application/zip"), None);
    }

    #[tokio::test]
    async fn test_create_then_get_by_date() {
        let app = test_app().await;

        let response = send(
            &app.router,
            Method::POST,
            "/api/timeline",
            Some(entry("2024-03-01", "Started sabbatical")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["title"], "Started sabbatical");

        let response = send(&app.router, Method::GET, "/api/timeline/date/2024-03-01", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], created["id"]);

        let uri = format!("/api/timeline/{}", created["id"].as_str().unwrap());
        let response = send(&app.router, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app.router, Method::GET, "/api/timeline/date/2024-03-01", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_served_from_cache() {
        let app = test_app().await;
        send(&app.router, Method::POST, "/api/timeline", Some(entry("2021-01-01", "A"))).await;
        send(&app.router, Method::POST, "/api/timeline", Some(entry("2023-01-01", "B"))).await;

        let first = body_json(send(&app.router, Method::GET, "/api/timeline", None).await).await;
        let second = body_json(send(&app.router, Method::GET, "/api/timeline", None).await).await;

        assert_eq!(first, second);
        assert_eq!(first[0]["title"], "B");
        assert_eq!(first[1]["title"], "A");
        assert_eq!(app.store.timeline_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let app = test_app().await;

        let response = send(&app.router, Method::GET, "/api/timeline/date/yesterday", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app.router,
            Method::POST,
            "/api/timeline",
            Some(entry("2024-01-01", "   ")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app.router, Method::GET, "/api/timeline/missing", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app.router, Method::DELETE, "/api/timeline/missing", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_attachment_lifecycle() {
        let app = test_app().await;

        let mut body = entry("2022-06-15", "Wrote a paper");
        body["file"] = json!({
            "name": "abstract.txt",
            "contentType": "text/plain",
            "data": STANDARD.encode("Abstract text"),
        });
        let response = send(&app.router, Method::POST, "/api/timeline", Some(body)).await;
        let created = body_json(response).await;
        let url = created["attachment"]["url"].as_str().unwrap().to_string();
        assert_eq!(created["attachment"]["kind"], "text");
        assert_eq!(created["attachment"]["originalName"], "abstract.txt");

        let path = url.trim_start_matches("http://localhost:3000");
        let response = send(&app.router, Method::GET, path, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"Abstract text");

        // Update without a file keeps the attachment
        let uri = format!("/api/timeline/{}", created["id"].as_str().unwrap());
        let body = entry("2022-06-15", "Published a paper");
        let updated = body_json(send(&app.router, Method::PUT, &uri, Some(body)).await).await;
        assert_eq!(updated["title"], "Published a paper");
        assert_eq!(updated["attachment"]["url"], url.as_str());

        // Removing it deletes the blob
        let mut body = entry("2022-06-15", "Published a paper");
        body["removeFile"] = json!(true);
        let updated = body_json(send(&app.router, Method::PUT, &uri, Some(body)).await).await;
        assert!(updated["attachment"].is_null());

        let response = send(&app.router, Method::GET, path, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn with_file(mut body: Value, name: &str, text: &str) -> Value {
        body["file"] = json!({
            "name": name,
            "contentType": "text/plain",
            "data": STANDARD.encode(text),
        });
        body
    }

    fn stored_documents(app: &TestApp) -> usize {
        std::fs::read_dir(app.blob_dir.path().join(DOCUMENTS_CONTAINER))
            .unwrap()
            .count()
    }

    #[tokio::test]
    async fn test_identical_attachments_deleted_independently() {
        let app = test_app().await;

        let body = with_file(entry("2019-09-01", "Joined Acme"), "cv.txt", "Curriculum vitae");
        let first =
            body_json(send(&app.router, Method::POST, "/api/timeline", Some(body)).await).await;
        let body = with_file(entry("2021-02-01", "Joined Initech"), "cv.txt", "Curriculum vitae");
        let second =
            body_json(send(&app.router, Method::POST, "/api/timeline", Some(body)).await).await;

        let first_url = first["attachment"]["url"].as_str().unwrap();
        let second_url = second["attachment"]["url"].as_str().unwrap();
        assert_ne!(first_url, second_url);

        let uri = format!("/api/timeline/{}", first["id"].as_str().unwrap());
        let response = send(&app.router, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let path = second_url.trim_start_matches("http://localhost:3000");
        let response = send(&app.router, Method::GET, path, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"Curriculum vitae");
    }

    #[tokio::test]
    async fn test_failed_write_discards_upload() {
        let app = test_app().await;
        let created = body_json(
            send(
                &app.router,
                Method::POST,
                "/api/timeline",
                Some(entry("2018-05-01", "Graduated")),
            )
            .await,
        )
        .await;
        app.store.set_fail_writes(true);

        let body = with_file(entry("2018-05-01", "Graduated"), "diploma.txt", "BSc");
        let uri = format!("/api/timeline/{}", created["id"].as_str().unwrap());
        let response = send(&app.router, Method::PUT, &uri, Some(body)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stored_documents(&app), 0);

        let body = with_file(entry("2018-06-01", "Moved"), "lease.txt", "Lease");
        let response = send(&app.router, Method::POST, "/api/timeline", Some(body)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stored_documents(&app), 0);
    }

    #[tokio::test]
    async fn test_unsupported_attachment_rejected() {
        let app = test_app().await;

        let mut body = entry("2022-06-15", "Archive");
        body["file"] = json!({
            "name": "a.zip",
            "contentType": "application/zip",
            "data": STANDARD.encode("PK"),
        });
        let response = send(&app.router, Method::POST, "/api/timeline", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.cache.get(&CacheKey::TimelineAll).await.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_opaque() {
        let app = test_app().await;
        app.store.set_fail_reads(true);

        let response = send(&app.router, Method::GET, "/api/timeline", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal server error");
    }
}
