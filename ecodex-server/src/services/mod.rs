//! Discovery pipeline services

pub mod discovery_ledger;
pub mod image_normalizer;
pub mod oracle_client;
pub mod oracle_parser;
pub mod pipeline;
pub mod rarity;

pub use discovery_ledger::{DiscoveryLedger, LedgerError, LedgerOutcome};
pub use image_normalizer::{ImageError, ImageNormalizer, NormalizedImage};
pub use oracle_client::{OracleError, SpeciesOracleClient};
pub use oracle_parser::{parse_species_response, ParseError};
pub use pipeline::{DiscoveryPipeline, IdentifyOutcome, PipelineError};
pub use rarity::{classify_rarity, experience_for_rarity, level_for_experience};
