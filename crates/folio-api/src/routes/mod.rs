pub mod files;
pub mod messages;
pub mod timeline;

use axum::routing::{get, patch};
use axum::Router;

use crate::state::AppState;

/// API and file routes, without CORS or body-limit layers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Timeline - specific routes before the id wildcard
        .route("/api/timeline/date/{date}", get(timeline::get_by_date))
        .route("/api/timeline", get(timeline::list).post(timeline::create))
        .route(
            "/api/timeline/{id}",
            get(timeline::get_by_id)
                .put(timeline::update)
                .delete(timeline::delete),
        )
        // Messages
        .route("/api/messages/stats", get(messages::stats))
        .route("/api/messages", get(messages::list).post(messages::create))
        .route(
            "/api/messages/{id}",
            get(messages::get_by_id).delete(messages::delete),
        )
        .route("/api/messages/{id}/read", patch(messages::mark_read))
        // Attachments
        .route("/files/{container}/{name}", get(files::download))
        .with_state(state)
}
