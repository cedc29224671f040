//! Error types for the build scheduler.

use std::path::PathBuf;

use kiln_cache::CacheError;
use kiln_discover::DiscoverError;
use kiln_toolchain::ToolchainError;

/// Errors that abort a build run.
///
/// None of these are retried; the first failure is surfaced with enough
/// context (path, fingerprint, or command) to diagnose. Fingerprinting and
/// cache-store problems share an underlying error type but are kept apart
/// here so a vanished source file is not mistaken for a broken store.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Dependency discovery failed before any compilation.
    #[error("dependency discovery failed: {0}")]
    Discover(#[from] DiscoverError),

    /// A discovered file could not be read and hashed.
    #[error("fingerprinting failed: {0}")]
    Fingerprint(#[source] CacheError),

    /// The persistent cache store could not be queried or written.
    #[error("cache store failure: {0}")]
    Cache(#[source] CacheError),

    /// An external compile or link command failed.
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// An I/O error while materializing build outputs.
    #[error("build I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The worker pool could not be constructed.
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
