//! User progression persistence
//!
//! Account creation and authentication live elsewhere; this module only
//! manages the progression columns (experience, level) that the ledger
//! owns. A progression row is created lazily the first time a user id
//! appears.

use anyhow::Result;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::models::UserProgress;

/// Create the progression row if this user has none yet
pub async fn ensure_user(conn: &mut SqliteConnection, user_id: Uuid) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO users (id, experience, level, created_at)
         VALUES (?, 0, 1, ?)",
    )
    .bind(user_id.to_string())
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(conn)
    .await?;
    Ok(())
}

/// Current experience total (callable inside a transaction)
pub async fn current_experience(conn: &mut SqliteConnection, user_id: Uuid) -> Result<i64> {
    let row = sqlx::query("SELECT experience FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_one(conn)
        .await?;
    Ok(row.get("experience"))
}

/// Write back the updated progression totals (callable inside a transaction)
pub async fn apply_progress(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    experience: i64,
    level: i64,
) -> Result<()> {
    sqlx::query("UPDATE users SET experience = ?, level = ? WHERE id = ?")
        .bind(experience)
        .bind(level)
        .bind(user_id.to_string())
        .execute(conn)
        .await?;
    Ok(())
}

/// Load a user's progression including the ordered discovery id list
pub async fn load_progress(pool: &SqlitePool, user_id: Uuid) -> Result<UserProgress> {
    let mut conn = pool.acquire().await?;
    ensure_user(&mut conn, user_id).await?;

    let row = sqlx::query("SELECT experience, level FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_one(&mut *conn)
        .await?;

    let id_rows = sqlx::query(
        "SELECT id FROM discoveries WHERE user_id = ? ORDER BY discovered_at ASC",
    )
    .bind(user_id.to_string())
    .fetch_all(&mut *conn)
    .await?;

    let discoveries = id_rows
        .into_iter()
        .map(|r| {
            let s: String = r.get("id");
            Ok(Uuid::parse_str(&s)?)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(UserProgress {
        user_id,
        experience: row.get("experience"),
        level: row.get("level"),
        discoveries,
    })
}
