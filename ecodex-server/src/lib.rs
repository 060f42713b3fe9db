//! ecodex-server library interface
//!
//! Exposes public APIs for integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{DiscoveryLedger, DiscoveryPipeline, ImageNormalizer, SpeciesOracleClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Discovery pipeline (normalizer + oracle + ledger)
    pub pipeline: Arc<DiscoveryPipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, oracle: SpeciesOracleClient) -> Self {
        let ledger = DiscoveryLedger::new(db.clone());
        let pipeline =
            DiscoveryPipeline::new(ImageNormalizer::new(), Arc::new(oracle), ledger);
        Self {
            db,
            pipeline: Arc::new(pipeline),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::identify_routes())
        .merge(api::chat_routes())
        .merge(api::entries_routes())
        .merge(api::stats_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
