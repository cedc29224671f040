//! The immutable build configuration value.

use std::collections::BTreeSet;

use kiln_common::{ContentHash, HashBuilder};

/// Global compiler and linker flags for a build, plus their fingerprint.
///
/// The fingerprint is part of every translation unit's cache key, so changing
/// a flag invalidates every cached object. It is computed once at construction
/// by a pure function over the *sorted, deduplicated* flag sets: two
/// configurations with the same flags in a different order, or with repeats,
/// fingerprint identically. The original flag order is preserved separately
/// for command-line construction.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    cflags: Vec<String>,
    ldflags: Vec<String>,
    fingerprint: ContentHash,
}

impl BuildConfig {
    /// Creates a configuration from compile and link flag lists.
    pub fn new(cflags: Vec<String>, ldflags: Vec<String>) -> Self {
        let fingerprint = fingerprint_flags(&cflags, &ldflags);
        Self {
            cflags,
            ldflags,
            fingerprint,
        }
    }

    /// The compile flags, in their original order.
    pub fn cflags(&self) -> &[String] {
        &self.cflags
    }

    /// The link flags, in their original order.
    pub fn ldflags(&self) -> &[String] {
        &self.ldflags
    }

    /// The configuration fingerprint.
    pub fn fingerprint(&self) -> ContentHash {
        self.fingerprint
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// Hashes the sorted, deduplicated compile flags followed by the sorted,
/// deduplicated link flags, in that fixed order.
fn fingerprint_flags(cflags: &[String], ldflags: &[String]) -> ContentHash {
    let mut builder = HashBuilder::new();
    for flag in cflags.iter().collect::<BTreeSet<_>>() {
        builder.update(flag.as_bytes());
    }
    for flag in ldflags.iter().collect::<BTreeSet<_>>() {
        builder.update(flag.as_bytes());
    }
    builder.finish()
}
