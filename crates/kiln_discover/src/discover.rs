//! The local-dependency graph walk.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::DiscoverError;
use crate::source::{Source, SOURCE_SUFFIXES};

/// The discovered unit set: one [`Source`] node per reachable file, keyed by
/// implementation-file path. `BTreeMap` keeps iteration deterministic.
pub type SourceMap = BTreeMap<PathBuf, Source>;

/// Walks the quoted-include graph from an entry file.
///
/// Each pending header is resolved to a sibling implementation file by
/// replacing its `.h`/`.hpp` suffix with one of the recognized source
/// suffixes. Headers whose implementation was already discovered are skipped,
/// which both deduplicates work and terminates cyclic include graphs: the
/// node map and the header visited-set only grow, so every distinct file is
/// processed at most once.
///
/// A header with no sibling implementation contributes no compilable node,
/// but if the header itself exists its quoted includes are still chased, so
/// discovery can walk through header-only dependency chains. A quoted include
/// that resolves to no file at all is dropped silently (it is external).
pub fn discover(entry: &Path) -> Result<SourceMap, DiscoverError> {
    let main = Source::parse(entry)?;

    let mut pending: BTreeSet<PathBuf> = main.local.iter().cloned().collect();
    let mut sources = SourceMap::new();
    sources.insert(entry.to_path_buf(), main);

    // Header-only headers already parsed, to keep cyclic header chains finite.
    let mut chased_headers: BTreeSet<PathBuf> = BTreeSet::new();

    while let Some(header) = pending.pop_first() {
        let candidates = impl_candidates(&header);

        if candidates.iter().any(|c| sources.contains_key(c)) {
            continue;
        }

        match candidates.iter().find(|c| c.exists()) {
            Some(impl_path) => {
                let hdr = Source::parse(&header)?;
                let src = Source::parse(impl_path)?;
                extend_pending(&mut pending, &hdr.local, &sources, &chased_headers);
                extend_pending(&mut pending, &src.local, &sources, &chased_headers);
                sources.insert(impl_path.clone(), src);
            }
            None => {
                if header.exists() && chased_headers.insert(header.clone()) {
                    let hdr = Source::parse(&header)?;
                    extend_pending(&mut pending, &hdr.local, &sources, &chased_headers);
                }
            }
        }
    }

    Ok(sources)
}

/// Candidate implementation paths for a header, in preference order.
fn impl_candidates(header: &Path) -> Vec<PathBuf> {
    match header.extension().and_then(|e| e.to_str()) {
        Some("h") | Some("hpp") => SOURCE_SUFFIXES
            .iter()
            .map(|suffix| header.with_extension(suffix))
            .collect(),
        _ => Vec::new(),
    }
}

fn extend_pending(
    pending: &mut BTreeSet<PathBuf>,
    locals: &BTreeSet<PathBuf>,
    sources: &SourceMap,
    chased_headers: &BTreeSet<PathBuf>,
) {
    for path in locals {
        if !sources.contains_key(path) && !chased_headers.contains(path) {
            pending.insert(path.clone());
        }
    }
}

/// Every unit path plus every local include referenced by any unit.
///
/// This is the full file set the fingerprinter must read.
pub fn file_set(sources: &SourceMap) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    for (path, source) in sources {
        files.insert(path.clone());
        files.extend(source.local.iter().cloned());
    }
    files
}
