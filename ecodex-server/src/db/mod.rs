//! Database access for the discovery service
//!
//! SQLite via sqlx; tables are created on startup if missing.

pub mod discoveries;
pub mod users;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create service tables if they don't exist
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            experience INTEGER NOT NULL DEFAULT 0,
            level INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS discoveries (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            name TEXT NOT NULL,
            scientific_name TEXT NOT NULL,
            description TEXT NOT NULL,
            species_type TEXT NOT NULL,
            rarity TEXT NOT NULL,
            habitat TEXT NOT NULL DEFAULT '',
            region TEXT NOT NULL DEFAULT '',
            image TEXT NOT NULL,
            original_image TEXT NOT NULL,
            stats TEXT NOT NULL,
            abilities TEXT NOT NULL,
            fun_facts TEXT NOT NULL,
            conservation_status TEXT NOT NULL,
            experience_points INTEGER NOT NULL,
            latitude REAL,
            longitude REAL,
            address TEXT,
            discovered_at TEXT NOT NULL,
            is_first_discovery INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Novelty check and listing queries
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_discoveries_user_species
         ON discoveries (user_id, scientific_name)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_discoveries_user_time
         ON discoveries (user_id, discovered_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
