//! Discovery ledger
//!
//! The only component permitted to create discovery entries and mutate
//! user progression. The novelty check, entry insert and progression
//! update run inside one SQLite transaction, and a per-user async mutex
//! serializes concurrent submissions so two simultaneous uploads of the
//! same species cannot both be flagged first-discovery.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::db;
use crate::models::{
    ConservationStatus, DiscoveryEntry, GeoLocation, Rarity, SpeciesDescription,
};
use crate::services::image_normalizer::NormalizedImage;
use crate::services::rarity::{experience_for_rarity, level_for_experience};

/// Ledger storage failures, keyed by the phase that failed. All writes
/// share one transaction, so any failure means nothing was persisted;
/// the phase is still reported so callers can tell a duplicate-risk
/// resubmit from a clean retry.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Novelty lookup failed (nothing persisted): {0}")]
    NoveltyCheck(String),

    #[error("Discovery insert failed (transaction rolled back, nothing persisted): {0}")]
    EntryInsert(String),

    #[error("Progression update failed after entry insert (transaction rolled back, nothing persisted): {0}")]
    ProgressUpdate(String),

    #[error("Transaction commit failed (nothing persisted): {0}")]
    Commit(String),
}

/// Result of one successful ledger transaction
#[derive(Debug, Clone)]
pub struct LedgerOutcome {
    pub entry: DiscoveryEntry,
    /// Experience awarded this run (doubled for first discoveries)
    pub xp_gained: i64,
    pub is_first_discovery: bool,
    pub new_level: i64,
    pub total_experience: i64,
}

/// Atomic linkage between new discoveries and user progression totals
#[derive(Clone)]
pub struct DiscoveryLedger {
    db: SqlitePool,
    user_locks: Arc<RwLock<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl DiscoveryLedger {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            user_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn lock_for_user(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        if let Some(lock) = self.user_locks.read().await.get(&user_id) {
            return lock.clone();
        }
        let mut locks = self.user_locks.write().await;
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Record a discovery and update the user's progression atomically.
    ///
    /// Novelty is determined here and fixed into the entry forever:
    /// `is_first_discovery` is true iff the user had no prior entry with
    /// the same scientific name. First discoveries award double XP.
    pub async fn record_discovery(
        &self,
        user_id: Uuid,
        species: &SpeciesDescription,
        rarity: Rarity,
        media: NormalizedImage,
        location: GeoLocation,
    ) -> Result<LedgerOutcome, LedgerError> {
        let lock = self.lock_for_user(user_id).await;
        let _guard = lock.lock().await;

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| LedgerError::NoveltyCheck(e.to_string()))?;

        let existing =
            db::discoveries::find_by_user_and_species(tx.as_mut(), user_id, &species.scientific_name)
                .await
                .map_err(|e| LedgerError::NoveltyCheck(e.to_string()))?;
        let is_first_discovery = existing.is_none();

        let experience_points = experience_for_rarity(rarity);

        let entry = DiscoveryEntry {
            id: Uuid::new_v4(),
            user_id,
            name: species.name.clone(),
            scientific_name: species.scientific_name.clone(),
            description: species.description.clone(),
            species_type: species.species_type,
            rarity,
            habitat: species.habitat.clone(),
            region: species.region.clone(),
            image: media.image_base64,
            original_image: media.original_base64,
            stats: species.stats.clone(),
            abilities: species.abilities.clone(),
            fun_facts: species.fun_facts.clone(),
            conservation_status: species
                .conservation_status
                .unwrap_or(ConservationStatus::LeastConcern),
            experience_points,
            location,
            discovered_at: Utc::now(),
            is_first_discovery,
        };

        // The discovery row references users(id); bootstrap the
        // progression row for ids we have not seen before
        db::users::ensure_user(tx.as_mut(), user_id)
            .await
            .map_err(|e| LedgerError::EntryInsert(e.to_string()))?;

        db::discoveries::insert_entry(tx.as_mut(), &entry)
            .await
            .map_err(|e| LedgerError::EntryInsert(e.to_string()))?;

        let experience = db::users::current_experience(tx.as_mut(), user_id)
            .await
            .map_err(|e| LedgerError::ProgressUpdate(e.to_string()))?;

        let xp_gained = experience_points * if is_first_discovery { 2 } else { 1 };
        let total_experience = experience + xp_gained;
        let new_level = level_for_experience(total_experience);

        db::users::apply_progress(tx.as_mut(), user_id, total_experience, new_level)
            .await
            .map_err(|e| LedgerError::ProgressUpdate(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| LedgerError::Commit(e.to_string()))?;

        Ok(LedgerOutcome {
            entry,
            xp_gained,
            is_first_discovery,
            new_level,
            total_experience,
        })
    }
}
