//! ecodex-server - Species discovery backend
//!
//! Accepts photo uploads, identifies the species via an external
//! multimodal oracle, and records discoveries with XP/level progression.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ecodex_server::services::SpeciesOracleClient;
use ecodex_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting ecodex-server (species discovery backend)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load TOML config and resolve with environment overrides
    let toml_config = ecodex_common::config::load_toml_config(None)?;
    let config = ecodex_server::config::resolve(&toml_config)?;

    info!("Database: {}", config.database_path.display());
    let db_pool = ecodex_server::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    let oracle = SpeciesOracleClient::new(config.oracle.clone())
        .map_err(|e| anyhow::anyhow!("Failed to build oracle client: {e}"))?;
    info!("Oracle endpoint: {}", config.oracle.base_url);

    let state = AppState::new(db_pool, oracle);
    let app = ecodex_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address.as_str()).await?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/api/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
