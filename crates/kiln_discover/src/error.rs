//! Error types for dependency discovery.

use std::path::PathBuf;

/// Errors that can occur while walking the local-include graph.
///
/// Discovery errors are fatal: the build aborts before any compilation.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// A file that discovery needed to read was missing or unreadable.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_path() {
        let err = DiscoverError::Io {
            path: PathBuf::from("src/main.cpp"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("src/main.cpp"));
        assert!(msg.contains("no such file"));
    }
}
