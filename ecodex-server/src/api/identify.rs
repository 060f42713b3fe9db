//! Species identification endpoint
//!
//! POST /api/ecodex/identify — multipart upload (image plus optional
//! latitude/longitude/address) through the full discovery pipeline.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{DiscoveryEntry, GeoLocation};
use crate::AppState;

/// Upstream collaborator enforces this too; rejected here as a backstop
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Multipart body limit: image cap plus headroom for the other fields
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// POST /api/ecodex/identify response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyResponse {
    pub success: bool,
    pub entry: DiscoveryEntry,
    pub xp_gained: i64,
    pub is_first_discovery: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    pub new_level: i64,
    pub total_xp: i64,
}

/// POST /api/ecodex/identify
pub async fn identify(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<IdentifyResponse>> {
    let mut image: Vec<u8> = Vec::new();
    let mut location = GeoLocation::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {e}")))?;
                if data.len() > MAX_IMAGE_BYTES {
                    return Err(ApiError::BadRequest(
                        "Image exceeds the 10 MiB limit".to_string(),
                    ));
                }
                image = data.to_vec();
            }
            Some("latitude") => {
                location.latitude = parse_coordinate(field.text().await, "latitude")?;
            }
            Some("longitude") => {
                location.longitude = parse_coordinate(field.text().await, "longitude")?;
            }
            Some("address") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read address: {e}")))?;
                if !text.is_empty() {
                    location.address = Some(text);
                }
            }
            _ => {}
        }
    }

    // Presence validation (empty image included) happens in the pipeline
    let outcome = state.pipeline.identify(user_id, &image, location).await?;

    Ok(Json(IdentifyResponse {
        success: true,
        entry: outcome.entry,
        xp_gained: outcome.xp_gained,
        is_first_discovery: outcome.is_first_discovery,
        confidence: outcome.confidence,
        new_level: outcome.new_level,
        total_xp: outcome.total_experience,
    }))
}

// Empty coordinate fields are common in browser form posts; treat them
// as absent rather than invalid.
fn parse_coordinate(
    text: Result<String, axum::extract::multipart::MultipartError>,
    name: &str,
) -> Result<Option<f64>, ApiError> {
    let text = text.map_err(|e| ApiError::BadRequest(format!("Failed to read {name}: {e}")))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {name}: {text}")))
}

/// Build identify routes
pub fn identify_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ecodex/identify", post(identify))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
