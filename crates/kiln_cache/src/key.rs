//! The per-unit cache key digest.

use kiln_common::{ContentHash, HashBuilder};

/// Computes the fingerprint identifying a unit's exact compilation inputs.
///
/// The digest covers, in fixed order: the unit's own content hash, the
/// configuration fingerprint, and the content hashes of the unit's direct
/// local includes. `local_hashes` must be supplied in canonical
/// (lexicographic) include-path order so that fingerprint equality never
/// depends on traversal or insertion order; the scheduler satisfies this by
/// iterating the unit's ordered include set.
pub fn unit_fingerprint(
    unit_hash: &ContentHash,
    config_fingerprint: &ContentHash,
    local_hashes: &[ContentHash],
) -> ContentHash {
    let mut builder = HashBuilder::new();
    builder.update(unit_hash.as_bytes());
    builder.update(config_fingerprint.as_bytes());
    for hash in local_hashes {
        builder.update(hash.as_bytes());
    }
    builder.finish()
}
