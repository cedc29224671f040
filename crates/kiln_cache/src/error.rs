//! Error types for fingerprinting and cache storage.

use std::path::PathBuf;

/// Errors that can occur during fingerprinting or cache-store operations.
///
/// All of these are fatal for the run. In particular, a store that cannot be
/// opened, queried, or written aborts the build rather than being treated as
/// a universal cache miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache index could not be parsed.
    #[error("failed to parse cache index {path}: {reason}")]
    IndexParse {
        /// The index file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A stored object file has an invalid or truncated header.
    #[error("invalid object header in {path}: {reason}")]
    InvalidHeader {
        /// The object file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The stored object's format version is not the current one.
    #[error("object format version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The object file path.
        path: PathBuf,
        /// The expected format version.
        expected: u32,
        /// The version found in the file.
        actual: u32,
    },

    /// The stored checksum does not match the payload.
    #[error("checksum mismatch in {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The object file path.
        path: PathBuf,
        /// The checksum recorded in the header.
        expected: String,
        /// The checksum computed from the payload.
        actual: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/kiln/index.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("index.json"));
    }

    #[test]
    fn index_parse_display() {
        let err = CacheError::IndexParse {
            path: PathBuf::from("index.json"),
            reason: "unexpected EOF".to_string(),
        };
        assert!(err.to_string().contains("unexpected EOF"));
    }

    #[test]
    fn checksum_mismatch_display() {
        let err = CacheError::ChecksumMismatch {
            path: PathBuf::from("objects/aabb.o"),
            expected: "aabb".to_string(),
            actual: "ccdd".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("checksum mismatch"));
        assert!(msg.contains("aabb"));
        assert!(msg.contains("ccdd"));
    }

    #[test]
    fn version_mismatch_display() {
        let err = CacheError::VersionMismatch {
            path: PathBuf::from("objects/old.o"),
            expected: 1,
            actual: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 1"));
        assert!(msg.contains("got 9"));
    }
}
