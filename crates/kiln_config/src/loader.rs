//! Configuration file loading.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::BuildConfig;

/// Raw TOML document shape. Both fields default to empty lists when absent.
#[derive(Debug, Deserialize)]
struct ConfigDoc {
    #[serde(default)]
    cflags: Vec<String>,
    #[serde(default)]
    ldflags: Vec<String>,
}

/// Loads a build configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses a build configuration from a TOML string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<BuildConfig, ConfigError> {
    let doc: ConfigDoc =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Ok(BuildConfig::new(doc.cflags, doc.ldflags))
}
