//! Configuration resolution
//!
//! Environment variables override the TOML file; when a value appears in
//! both, the environment wins and a warning names the ignored source.

use ecodex_common::config::TomlConfig;
use ecodex_common::{Error, Result};
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";
const DEFAULT_ORACLE_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ORACLE_MODEL: &str = "gpt-4o-mini";

/// Species oracle connection settings
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub database_path: PathBuf,
    pub oracle: OracleConfig,
}

/// Resolve the server configuration from ENV -> TOML -> defaults
pub fn resolve(toml_config: &TomlConfig) -> Result<ServerConfig> {
    let bind_address = std::env::var("ECODEX_BIND_ADDRESS")
        .ok()
        .or_else(|| toml_config.bind_address.clone())
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

    let database_path = std::env::var("ECODEX_DATABASE_PATH")
        .ok()
        .map(PathBuf::from)
        .or_else(|| toml_config.database_path.clone().map(PathBuf::from))
        .unwrap_or_else(ecodex_common::config::default_database_path);

    let oracle = resolve_oracle_config(toml_config)?;

    Ok(ServerConfig {
        bind_address,
        database_path,
        oracle,
    })
}

/// Resolve oracle settings. The API key is mandatory; base URL and model
/// have compiled defaults.
pub fn resolve_oracle_config(toml_config: &TomlConfig) -> Result<OracleConfig> {
    let toml_oracle = toml_config.oracle.clone().unwrap_or_default();

    let env_key = std::env::var("ECODEX_ORACLE_API_KEY")
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_oracle.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Oracle API key found in both environment and TOML config. \
             Using environment (highest priority)."
        );
    }

    let api_key = match (env_key, toml_key) {
        (Some(key), _) => {
            info!("Oracle API key loaded from environment variable");
            key
        }
        (None, Some(key)) => {
            info!("Oracle API key loaded from TOML config");
            key
        }
        (None, None) => {
            return Err(Error::Config(
                "Oracle API key not configured. Please configure using one of:\n\
                 1. Environment: ECODEX_ORACLE_API_KEY=your-key-here\n\
                 2. TOML config: ~/.config/ecodex/ecodex.toml ([oracle] api_key = \"your-key\")"
                    .to_string(),
            ))
        }
    };

    let base_url = std::env::var("ECODEX_ORACLE_BASE_URL")
        .ok()
        .or(toml_oracle.base_url)
        .unwrap_or_else(|| DEFAULT_ORACLE_BASE_URL.to_string());

    let model = std::env::var("ECODEX_ORACLE_MODEL")
        .ok()
        .or(toml_oracle.model)
        .unwrap_or_else(|| DEFAULT_ORACLE_MODEL.to_string());

    Ok(OracleConfig {
        base_url,
        api_key,
        model,
    })
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
