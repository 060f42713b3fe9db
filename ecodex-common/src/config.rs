//! Configuration file loading
//!
//! The backend reads an optional TOML file and lets environment variables
//! override individual values (resolution happens in the server crate).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration file contents
///
/// All fields are optional; missing values fall back to environment
/// variables or compiled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Socket address the HTTP server binds to (e.g. "0.0.0.0:5000")
    pub bind_address: Option<String>,

    /// Path to the SQLite database file
    pub database_path: Option<String>,

    /// Species oracle settings
    pub oracle: Option<OracleToml>,
}

/// Oracle section of the TOML config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleToml {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: Option<String>,

    /// API key for the oracle service
    pub api_key: Option<String>,

    /// Model identifier to request
    pub model: Option<String>,
}

/// Default configuration file path for the platform
/// (~/.config/ecodex/ecodex.toml on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ecodex").join("ecodex.toml"))
}

/// Default database path for the platform
/// (~/.local/share/ecodex/ecodex.db on Linux)
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ecodex").join("ecodex.db"))
        .unwrap_or_else(|| PathBuf::from("./ecodex_data/ecodex.db"))
}

/// Load the TOML config from an explicit path, or from the default
/// location. A missing file is not an error; defaults apply.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(TomlConfig::default()),
        },
    };

    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read config file failed: {}", e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse config file failed: {}", e)))?;

    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml = r#"
            bind_address = "127.0.0.1:5000"
            database_path = "/tmp/ecodex.db"

            [oracle]
            base_url = "http://localhost:11434/v1"
            api_key = "test-key"
            model = "gpt-4o-mini"
        "#;
        let config: TomlConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_address.as_deref(), Some("127.0.0.1:5000"));
        let oracle = config.oracle.unwrap();
        assert_eq!(oracle.api_key.as_deref(), Some("test-key"));
        assert_eq!(oracle.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.bind_address.is_none());
        assert!(config.database_path.is_none());
        assert!(config.oracle.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = load_toml_config(Some(&path)).unwrap();
        assert!(config.oracle.is_none());
    }
}
