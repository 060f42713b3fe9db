//! Discovery pipeline orchestrator
//!
//! Sequences normalize -> oracle -> parse -> classify -> ledger. Any
//! component failure aborts the remaining steps; the error taxonomy keeps
//! retryable conditions (oracle unreachable) distinct from fatal ones
//! (bad image, malformed reply).

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DiscoveryEntry, GeoLocation};
use crate::services::discovery_ledger::{DiscoveryLedger, LedgerError};
use crate::services::image_normalizer::{ImageError, ImageNormalizer};
use crate::services::oracle_client::{OracleError, SpeciesOracleClient};
use crate::services::oracle_parser::parse_species_response;
use crate::services::rarity::classify_rarity;

/// Pipeline error taxonomy. Every failure surfaces to the boundary with
/// a machine-distinguishable kind; none are downgraded to success.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller must resubmit with valid input; not retryable as-is
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Corrupt or unsupported image; not retryable
    #[error("{0}")]
    ImageDecode(String),

    /// Transport/auth/quota failure; retryable after backoff
    #[error("Species oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Oracle replied but not in the expected schema. Carries the raw
    /// text for prompt-drift diagnosis; never retried automatically.
    #[error("Malformed oracle response: {reason}")]
    MalformedOracleResponse { reason: String, raw: String },

    /// Storage failure; the message reports which ledger phase failed
    #[error("Persistence failure: {0}")]
    Persistence(#[from] LedgerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ImageError> for PipelineError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Decode(msg) => {
                PipelineError::ImageDecode(format!("Unsupported or corrupt image: {msg}"))
            }
            ImageError::Encode(msg) => PipelineError::Internal(msg),
        }
    }
}

impl From<OracleError> for PipelineError {
    fn from(err: OracleError) -> Self {
        PipelineError::OracleUnavailable(err.to_string())
    }
}

/// Successful identify run
#[derive(Debug, Clone)]
pub struct IdentifyOutcome {
    pub entry: DiscoveryEntry,
    pub xp_gained: i64,
    pub is_first_discovery: bool,
    /// Oracle's self-reported confidence, passed through untouched
    pub confidence: Option<String>,
    pub new_level: i64,
    pub total_experience: i64,
}

/// Orchestrates one discovery run per inbound request
pub struct DiscoveryPipeline {
    normalizer: ImageNormalizer,
    oracle: Arc<SpeciesOracleClient>,
    ledger: DiscoveryLedger,
}

impl DiscoveryPipeline {
    pub fn new(
        normalizer: ImageNormalizer,
        oracle: Arc<SpeciesOracleClient>,
        ledger: DiscoveryLedger,
    ) -> Self {
        Self {
            normalizer,
            oracle,
            ledger,
        }
    }

    /// Run the full discovery pipeline for one uploaded image
    pub async fn identify(
        &self,
        user_id: Uuid,
        image: &[u8],
        location: GeoLocation,
    ) -> Result<IdentifyOutcome, PipelineError> {
        if image.is_empty() {
            return Err(PipelineError::InvalidInput(
                "No image file provided".to_string(),
            ));
        }

        let media = self.normalizer.normalize(image)?;
        tracing::debug!(
            width = media.width,
            height = media.height,
            "image normalized"
        );

        let raw = self.oracle.identify_species(&media.image_base64).await?;

        let species = parse_species_response(&raw).map_err(|e| {
            tracing::warn!("Oracle reply failed to parse: {e}");
            PipelineError::MalformedOracleResponse {
                reason: e.to_string(),
                raw: raw.clone(),
            }
        })?;

        let rarity = classify_rarity(species.conservation_status, species.commonality.as_deref());
        let confidence = species.confidence.clone();

        let outcome = self
            .ledger
            .record_discovery(user_id, &species, rarity, media, location)
            .await?;

        tracing::info!(
            user = %user_id,
            species = %outcome.entry.scientific_name,
            rarity = rarity.as_str(),
            xp = outcome.xp_gained,
            first = outcome.is_first_discovery,
            "discovery recorded"
        );

        Ok(IdentifyOutcome {
            entry: outcome.entry,
            xp_gained: outcome.xp_gained,
            is_first_discovery: outcome.is_first_discovery,
            confidence,
            new_level: outcome.new_level,
            total_experience: outcome.total_experience,
        })
    }

    /// Conversational turn: at least one of message/image must be present.
    /// No state machine, no structured-output expectation.
    pub async fn chat(
        &self,
        message: Option<&str>,
        image: Option<&[u8]>,
    ) -> Result<String, PipelineError> {
        let has_message = message.map(|m| !m.trim().is_empty()).unwrap_or(false);
        if !has_message && image.is_none() {
            return Err(PipelineError::InvalidInput(
                "Please provide a message or image".to_string(),
            ));
        }

        let image_base64 = match image {
            Some(bytes) => Some(self.normalizer.normalize(bytes)?.image_base64),
            None => None,
        };

        Ok(self.oracle.chat(message, image_base64.as_deref()).await?)
    }
}
