//! Error types for configuration loading.

/// Errors that can occur when loading a kiln build configuration.
///
/// Both variants are fatal at startup, before any build I/O happens.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}
