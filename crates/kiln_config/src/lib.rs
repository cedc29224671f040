//! Parsing and validation of kiln build configuration files.
//!
//! This crate reads the TOML build configuration (compile and link flag lists)
//! and produces an immutable [`BuildConfig`] whose fingerprint is computed once
//! at construction.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::BuildConfig;
