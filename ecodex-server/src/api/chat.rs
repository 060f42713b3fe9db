//! Field-guide chat endpoint
//!
//! POST /api/ecodex/chat — free-form conversation with the oracle persona.
//! Stateless passthrough; shares the pipeline's client and normalizer but
//! persists nothing.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// POST /api/ecodex/chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

/// POST /api/ecodex/chat
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<ChatResponse>> {
    let mut message: Option<String> = None;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("message") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read message: {e}")))?;
                if !text.trim().is_empty() {
                    message = Some(text);
                }
            }
            Some("image") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {e}")))?;
                if !data.is_empty() {
                    image = Some(data.to_vec());
                }
            }
            _ => {}
        }
    }

    let reply = state
        .pipeline
        .chat(message.as_deref(), image.as_deref())
        .await?;

    Ok(Json(ChatResponse {
        success: true,
        response: reply,
    }))
}

/// Build chat routes
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ecodex/chat", post(chat))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
