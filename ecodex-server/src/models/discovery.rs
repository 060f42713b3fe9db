//! Discovery entry model
//!
//! One `DiscoveryEntry` records a single confirmed species identification.
//! Entries are created exactly once by the ledger and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of organism identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesType {
    Plant,
    Animal,
}

impl SpeciesType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeciesType::Plant => "plant",
            SpeciesType::Animal => "animal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "plant" => Some(SpeciesType::Plant),
            "animal" => Some(SpeciesType::Animal),
            _ => None,
        }
    }
}

/// Rarity tier, used for display and XP weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

/// IUCN-style conservation status as self-reported by the oracle
///
/// The oracle sometimes invents status strings; anything outside the known
/// set deserializes to `Unknown` and falls through rarity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservationStatus {
    LeastConcern,
    NearThreatened,
    Vulnerable,
    Endangered,
    CriticallyEndangered,
    Extinct,
    #[serde(other)]
    Unknown,
}

impl ConservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConservationStatus::LeastConcern => "least_concern",
            ConservationStatus::NearThreatened => "near_threatened",
            ConservationStatus::Vulnerable => "vulnerable",
            ConservationStatus::Endangered => "endangered",
            ConservationStatus::CriticallyEndangered => "critically_endangered",
            ConservationStatus::Extinct => "extinct",
            ConservationStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "least_concern" => ConservationStatus::LeastConcern,
            "near_threatened" => ConservationStatus::NearThreatened,
            "vulnerable" => ConservationStatus::Vulnerable,
            "endangered" => ConservationStatus::Endangered,
            "critically_endangered" => ConservationStatus::CriticallyEndangered,
            "extinct" => ConservationStatus::Extinct,
            _ => ConservationStatus::Unknown,
        }
    }
}

/// Free-text species stats (all optional; plants have no diet, etc.)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesStats {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub lifespan: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
}

/// Notable ability or characteristic of the species
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub description: String,
}

/// Caller-supplied capture location (never derived from the image)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

/// One persisted species identification event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,

    /// Dedup key for the per-user novelty check
    pub scientific_name: String,

    pub description: String,
    #[serde(rename = "type")]
    pub species_type: SpeciesType,
    pub rarity: Rarity,
    pub habitat: String,
    pub region: String,

    /// Normalized image, base64 JPEG
    pub image: String,
    /// User's original upload, base64
    pub original_image: String,

    pub stats: SpeciesStats,
    pub abilities: Vec<Ability>,
    pub fun_facts: Vec<String>,
    pub conservation_status: ConservationStatus,

    /// Assigned once at creation from the rarity table; never recomputed
    pub experience_points: i64,

    pub location: GeoLocation,
    pub discovered_at: DateTime<Utc>,

    /// True iff this was the user's first entry for this scientific name,
    /// fixed at creation time
    pub is_first_discovery: bool,
}
