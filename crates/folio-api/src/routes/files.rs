use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use folio_blob_store::BlobStoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Serve an attachment blob.
///
/// Blob names are never reused and blobs are never rewritten, so responses can
/// be cached indefinitely by clients.
pub async fn download(
    State(state): State<AppState>,
    Path((container, name)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let blob = match state.blobs.download(&container, &name).await {
        Ok(Some(blob)) => blob,
        Ok(None) | Err(BlobStoreError::InvalidName(_)) => {
            return Err(AppError::NotFound("File not found".into()))
        }
        Err(e) => return Err(e.into()),
    };

    let disposition = format!(
        "inline; filename=\"{}\"",
        blob.meta.original_name.replace(['"', '\\'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, blob.meta.content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        blob.data,
    )
        .into_response())
}
