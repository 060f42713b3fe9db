//! Rarity classification and the XP/level tables
//!
//! Pure functions, deliberately kept standalone so the mapping between
//! rarity and experience lives in exactly one place.

use crate::models::{ConservationStatus, Rarity};

/// Map conservation status and the oracle's commonality hint to a rarity
/// tier. First match wins; endangerment always dominates reported
/// commonality.
pub fn classify_rarity(
    conservation_status: Option<ConservationStatus>,
    commonality: Option<&str>,
) -> Rarity {
    use ConservationStatus::*;

    match conservation_status {
        Some(CriticallyEndangered) | Some(Extinct) => return Rarity::Legendary,
        Some(Endangered) => return Rarity::Epic,
        Some(Vulnerable) | Some(NearThreatened) => return Rarity::Rare,
        // LeastConcern, Unknown and absent all fall through to commonality
        _ => {}
    }

    let uncommon = commonality
        .map(|c| c.to_lowercase().contains("uncommon"))
        .unwrap_or(false);
    if uncommon {
        Rarity::Uncommon
    } else {
        Rarity::Common
    }
}

/// Experience points awarded for a discovery of the given rarity
pub fn experience_for_rarity(rarity: Rarity) -> i64 {
    match rarity {
        Rarity::Common => 10,
        Rarity::Uncommon => 25,
        Rarity::Rare => 50,
        Rarity::Epic => 100,
        Rarity::Legendary => 200,
    }
}

/// Level derived from total experience: every 100 XP is one level
pub fn level_for_experience(experience: i64) -> i64 {
    experience / 100 + 1
}
