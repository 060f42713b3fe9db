//! Species description as returned by the oracle
//!
//! This is the schema the identify prompt asks for. Only the identity
//! fields are mandatory; everything else defaults so a slightly sparse
//! oracle reply still produces an entry.

use serde::{Deserialize, Serialize};

use super::{Ability, ConservationStatus, SpeciesStats, SpeciesType};

/// Structured payload parsed out of the oracle's free-form reply
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesDescription {
    /// Common name
    pub name: String,

    /// Scientific name (Genus species) — the per-user dedup key
    pub scientific_name: String,

    #[serde(rename = "type")]
    pub species_type: SpeciesType,

    pub description: String,

    #[serde(default)]
    pub habitat: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub stats: SpeciesStats,

    #[serde(default)]
    pub abilities: Vec<Ability>,

    #[serde(default)]
    pub fun_facts: Vec<String>,

    /// Absent or unrecognized status falls through rarity classification
    #[serde(default)]
    pub conservation_status: Option<ConservationStatus>,

    /// Free-text commonality hint ("very common" ... "very rare")
    #[serde(default)]
    pub commonality: Option<String>,

    /// Oracle's self-reported confidence (High/Medium/Low).
    /// Informational only; never gates persistence.
    #[serde(default)]
    pub confidence: Option<String>,
}
