//! Data models for the discovery service

pub mod discovery;
pub mod progress;
pub mod species;

pub use discovery::{
    Ability, ConservationStatus, DiscoveryEntry, GeoLocation, Rarity, SpeciesStats, SpeciesType,
};
pub use progress::UserProgress;
pub use species::SpeciesDescription;
