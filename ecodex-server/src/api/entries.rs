//! Discovery listing endpoints
//!
//! GET /api/ecodex/entries and GET /api/ecodex/entries/:id, always scoped
//! to the authenticated user.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AuthUser;
use crate::db::discoveries::{self, EntryFilter};
use crate::error::{ApiError, ApiResult};
use crate::models::{DiscoveryEntry, Rarity, SpeciesType};
use crate::AppState;

/// GET /api/ecodex/entries query parameters
#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub species_type: Option<SpeciesType>,
    pub rarity: Option<Rarity>,
}

/// GET /api/ecodex/entries response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriesResponse {
    pub entries: Vec<DiscoveryEntry>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}

/// GET /api/ecodex/entries
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<EntriesQuery>,
) -> ApiResult<Json<EntriesResponse>> {
    let filter = EntryFilter {
        species_type: query.species_type,
        rarity: query.rarity,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(10).clamp(1, 100),
    };

    let (entries, total) = discoveries::list_entries(&state.db, user_id, &filter).await?;
    let total_pages = (total + filter.limit - 1) / filter.limit;

    Ok(Json(EntriesResponse {
        entries,
        total_pages,
        current_page: filter.page,
        total,
    }))
}

/// GET /api/ecodex/entries/:id
pub async fn entry_by_id(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(entry_id): Path<Uuid>,
) -> ApiResult<Json<DiscoveryEntry>> {
    let entry = discoveries::find_by_id(&state.db, user_id, entry_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Discovery entry not found: {entry_id}")))?;

    Ok(Json(entry))
}

/// Build entries routes
pub fn entries_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ecodex/entries", get(list_entries))
        .route("/api/ecodex/entries/:id", get(entry_by_id))
}
