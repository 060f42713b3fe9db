//! User discovery statistics endpoint
//!
//! GET /api/ecodex/stats — totals, per-type/per-rarity tallies, recent
//! discoveries and progression.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::AuthUser;
use crate::db::{discoveries, users};
use crate::db::discoveries::RecentDiscovery;
use crate::error::ApiResult;
use crate::AppState;

const RECENT_LIMIT: i64 = 5;

/// One bucket of a grouped count
#[derive(Debug, Serialize)]
pub struct TallyEntry {
    pub label: String,
    pub count: i64,
}

/// GET /api/ecodex/stats response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_entries: i64,
    pub type_stats: Vec<TallyEntry>,
    pub rarity_stats: Vec<TallyEntry>,
    pub recent_entries: Vec<RecentDiscovery>,
    pub experience: i64,
    pub level: i64,
}

/// GET /api/ecodex/stats
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<StatsResponse>> {
    let total_entries = discoveries::count_entries(&state.db, user_id).await?;
    let type_stats = to_tallies(discoveries::counts_by_type(&state.db, user_id).await?);
    let rarity_stats = to_tallies(discoveries::counts_by_rarity(&state.db, user_id).await?);
    let recent_entries = discoveries::recent_entries(&state.db, user_id, RECENT_LIMIT).await?;
    let progress = users::load_progress(&state.db, user_id).await?;

    Ok(Json(StatsResponse {
        total_entries,
        type_stats,
        rarity_stats,
        recent_entries,
        experience: progress.experience,
        level: progress.level,
    }))
}

fn to_tallies(counts: Vec<(String, i64)>) -> Vec<TallyEntry> {
    counts
        .into_iter()
        .map(|(label, count)| TallyEntry { label, count })
        .collect()
}

/// Build stats routes
pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/api/ecodex/stats", get(stats))
}
