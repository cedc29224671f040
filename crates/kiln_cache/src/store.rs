//! Durable object-byte storage.
//!
//! Each cached artifact lives at `<cache_dir>/objects/<fingerprint-hex>.o`,
//! framed by a binary header containing magic bytes, a format version, and a
//! payload checksum. Unlike change detection, storage validation is strict: a
//! corrupt or truncated object is an error, not a miss, so storage problems
//! surface instead of causing silent recompilation.

use std::path::{Path, PathBuf};

use kiln_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Magic bytes identifying a kiln cache object.
const OBJECT_MAGIC: [u8; 4] = *b"KILN";

/// Current object framing version. Increment on breaking changes.
const OBJECT_FORMAT_VERSION: u32 = 1;

/// Subdirectory holding the object files.
const OBJECTS_SUBDIR: &str = "objects";

/// File extension for stored objects.
const OBJECT_EXT: &str = "o";

/// Header prepended to every stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObjectHeader {
    /// Magic bytes: must be `b"KILN"`.
    magic: [u8; 4],

    /// Object framing version.
    format_version: u32,

    /// Content hash of the payload, for corruption detection.
    checksum: ContentHash,
}

/// Content-addressed store for compiled object bytes.
#[derive(Debug)]
pub struct ObjectStore {
    cache_dir: PathBuf,
}

impl ObjectStore {
    /// Creates a store rooted at the given cache directory.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Creates the objects subdirectory if needed. Idempotent.
    pub fn ensure_dirs(&self) -> Result<(), CacheError> {
        let dir = self.cache_dir.join(OBJECTS_SUBDIR);
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
            path: dir,
            source: e,
        })
    }

    /// The file path for the object with the given fingerprint key.
    pub fn object_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(OBJECTS_SUBDIR)
            .join(format!("{key}.{OBJECT_EXT}"))
    }

    /// Writes an object under the given fingerprint key.
    ///
    /// An existing object with the same key is rewritten; fingerprints are
    /// defined so that equal keys imply byte-identical payloads.
    pub fn write(&self, key: &str, data: &[u8]) -> Result<(), CacheError> {
        self.ensure_dirs()?;
        let path = self.object_path(key);

        let header = ObjectHeader {
            magic: OBJECT_MAGIC,
            format_version: OBJECT_FORMAT_VERSION,
            checksum: ContentHash::from_bytes(data),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        // Layout: 4-byte header length (little-endian) + header + payload.
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + data.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(data);

        std::fs::write(&path, &output).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Reads the object stored under the given key.
    ///
    /// A missing object is `Ok(None)`, the explicit absent indicator, kept
    /// distinct from an empty-but-present payload. Anything else that
    /// prevents returning the exact stored bytes is an error.
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.object_path(key);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io { path, source: e }),
        };

        if raw.len() < 4 {
            return Err(CacheError::InvalidHeader {
                path,
                reason: "file shorter than header length prefix".to_string(),
            });
        }
        let header_len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
        if raw.len() < 4 + header_len {
            return Err(CacheError::InvalidHeader {
                path,
                reason: "truncated header".to_string(),
            });
        }

        let header: ObjectHeader =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .map_err(|e| CacheError::InvalidHeader {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
                .0;

        if header.magic != OBJECT_MAGIC {
            return Err(CacheError::InvalidHeader {
                path,
                reason: "bad magic bytes".to_string(),
            });
        }
        if header.format_version != OBJECT_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path,
                expected: OBJECT_FORMAT_VERSION,
                actual: header.format_version,
            });
        }

        let payload = &raw[4 + header_len..];
        let actual = ContentHash::from_bytes(payload);
        if actual != header.checksum {
            return Err(CacheError::ChecksumMismatch {
                path,
                expected: header.checksum.to_string(),
                actual: actual.to_string(),
            });
        }

        Ok(Some(payload.to_vec()))
    }
}
