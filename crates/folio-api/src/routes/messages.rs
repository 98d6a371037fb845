use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_db::{CreateMessageParams, Message, MessageStats};
use serde::Deserialize;
use serde_json::{json, Value};
use ts_rs::TS;

use crate::constants::{MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateMessageRequest {
    name: String,
    email: String,
    message: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let messages = state.messages.list_all().await?;
    Ok(Json(messages.as_slice()).into_response())
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<MessageStats>, AppError> {
    Ok(Json(state.messages.stats().await?))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, AppError> {
    state
        .messages
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let params = CreateMessageParams::new(&body.name, &body.email, &body.message);

    if params.name.is_empty() || params.name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Name must be 1-{MAX_NAME_LENGTH} characters"
        )));
    }
    if !is_plausible_email(&params.email) {
        return Err(AppError::BadRequest("A valid email address is required".into()));
    }
    if params.message.is_empty() || params.message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Message must be 1-{MAX_MESSAGE_LENGTH} characters"
        )));
    }

    let message = state.messages.create(&params).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, AppError> {
    state
        .messages
        .mark_read(&id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.messages.delete(&id).await? {
        return Err(not_found());
    }
    Ok(Json(json!({ "success": true })))
}

fn not_found() -> AppError {
    AppError::NotFound("Message not found".into())
}

/// One `@` with something on both sides and a dot in the domain
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
