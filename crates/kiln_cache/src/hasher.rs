//! File-content fingerprinting.
//!
//! Reads and hashes every file in the discovered set exactly once per run.
//! Implementation files were already validated to exist during discovery, but
//! header-only references are read here for the first time, so a missing or
//! unreadable file at this stage is a fatal configuration error.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use kiln_common::ContentHash;

use crate::error::CacheError;

/// Computes content hashes for the discovered file set.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the content hash of a single file.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }

    /// Hashes every path in the set, reading each distinct file once.
    ///
    /// Any file that cannot be read fails the whole run.
    pub fn hash_files(paths: &BTreeSet<PathBuf>) -> Result<HashMap<PathBuf, ContentHash>, CacheError> {
        let mut hashes = HashMap::with_capacity(paths.len());
        for path in paths {
            hashes.insert(path.clone(), Self::hash_file(path)?);
        }
        Ok(hashes)
    }
}
