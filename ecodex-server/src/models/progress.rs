//! User progression state

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gamification subset of the user profile
///
/// `experience` is monotonically non-decreasing and only the ledger
/// increments it. `level` is always `floor(experience / 100) + 1`,
/// recomputed on every update so it can never drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: Uuid,
    pub experience: i64,
    pub level: i64,

    /// Entry ids owned by this user, oldest first (append-only)
    pub discoveries: Vec<Uuid>,
}
