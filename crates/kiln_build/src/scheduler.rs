//! Cache-hit/miss planning, worker dispatch, and linking.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use kiln_cache::{unit_fingerprint, BuildCache, SourceHasher};
use kiln_common::ContentHash;
use kiln_config::BuildConfig;
use kiln_discover::{file_set, SourceMap};
use kiln_toolchain::Toolchain;

use crate::error::BuildError;

/// Where and how to build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory object files are materialized under. A unit whose target
    /// path is absolute overrides this (standard path-join semantics).
    pub build_dir: PathBuf,

    /// Path of the linked binary.
    pub output: PathBuf,

    /// Worker pool size for compile tasks.
    pub jobs: usize,
}

/// What a finished build did.
#[derive(Debug)]
pub struct BuildReport {
    /// The linked binary path.
    pub binary: PathBuf,

    /// Object files passed to the linker, in deterministic unit order.
    pub objects: Vec<PathBuf>,

    /// Units restored from the cache.
    pub hits: Vec<PathBuf>,

    /// Units whose objects were produced by compilation this run, directly
    /// or by sharing a fingerprint with a compiled unit.
    pub compiled: Vec<PathBuf>,
}

/// A deferred compile for one cache miss.
struct CompileTask {
    source: PathBuf,
    object: PathBuf,
    fingerprint: ContentHash,
}

/// Builds the discovered unit set into a linked binary.
///
/// Per compilable unit: fingerprint, cache lookup, then either restore the
/// cached object bytes or record a miss. Misses are deduplicated by
/// fingerprint before dispatch, so units with identical inputs share one
/// compile and one insert. Distinct tasks run on a worker pool of exactly
/// `options.jobs` threads; workers never touch the cache. Results are
/// collected after the pool drains and inserted serially by this
/// coordinator, which together with the deduplication guarantees at most
/// one insert per fingerprint per run. The collection short-circuits on the
/// first compile failure, so a failed batch inserts nothing. Finally the
/// ordered object list is linked; no partial binary is produced on failure.
/// Entries inserted before a failing link are kept (they are genuinely
/// successful sub-compilations).
pub fn build(
    sources: &SourceMap,
    config: &BuildConfig,
    toolchain: &dyn Toolchain,
    cache: &mut BuildCache,
    options: &BuildOptions,
) -> Result<BuildReport, BuildError> {
    let hashes = SourceHasher::hash_files(&file_set(sources)).map_err(BuildError::Fingerprint)?;

    let mut objects = Vec::new();
    let mut hits = Vec::new();
    let mut misses = Vec::new();

    for source in sources.values() {
        let Some(target) = source.target() else {
            continue;
        };
        let object = options.build_dir.join(&target);
        ensure_parent(&object)?;

        let unit_hash = hashes[&source.path];
        let local_hashes: Vec<ContentHash> =
            source.local.iter().map(|path| hashes[path]).collect();
        let fingerprint = unit_fingerprint(&unit_hash, &config.fingerprint(), &local_hashes);

        match cache.lookup(&fingerprint).map_err(BuildError::Cache)? {
            Some(bytes) => {
                std::fs::write(&object, &bytes).map_err(|e| BuildError::Io {
                    path: object.clone(),
                    source: e,
                })?;
                hits.push(source.path.clone());
            }
            None => {
                misses.push(CompileTask {
                    source: source.path.clone(),
                    object: object.clone(),
                    fingerprint,
                });
            }
        }
        objects.push(object);
    }

    // Units with byte-identical inputs share a fingerprint; each distinct
    // fingerprint is compiled exactly once.
    let mut scheduled: HashSet<ContentHash> = HashSet::new();
    let tasks: Vec<&CompileTask> = misses
        .iter()
        .filter(|task| scheduled.insert(task.fingerprint))
        .collect();

    let compiled = run_compile_tasks(&tasks, config, toolchain, options.jobs)?;

    for (fingerprint, bytes) in &compiled {
        cache.insert(fingerprint, bytes).map_err(BuildError::Cache)?;
    }
    cache.save().map_err(BuildError::Cache)?;

    // Misses that shared another unit's compile get its object bytes.
    let produced: HashMap<ContentHash, Vec<u8>> = compiled.into_iter().collect();
    let dispatched: HashSet<&Path> = tasks.iter().map(|task| task.object.as_path()).collect();
    for task in &misses {
        if !dispatched.contains(task.object.as_path()) {
            std::fs::write(&task.object, &produced[&task.fingerprint]).map_err(|e| {
                BuildError::Io {
                    path: task.object.clone(),
                    source: e,
                }
            })?;
        }
    }

    toolchain.link(config.cflags(), config.ldflags(), &objects, &options.output)?;

    Ok(BuildReport {
        binary: options.output.clone(),
        objects,
        hits,
        compiled: misses.into_iter().map(|t| t.source).collect(),
    })
}

/// Runs all deferred compiles on a bounded pool and collects their outputs.
///
/// Each worker invokes one external compile to completion and reads the
/// produced object bytes back; the coordinator re-associates every result
/// with its own fingerprint, so worker finish order never matters.
fn run_compile_tasks(
    tasks: &[&CompileTask],
    config: &BuildConfig,
    toolchain: &dyn Toolchain,
    jobs: usize,
) -> Result<Vec<(ContentHash, Vec<u8>)>, BuildError> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
    pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                toolchain.compile(config.cflags(), &task.source, &task.object)?;
                let bytes = std::fs::read(&task.object).map_err(|e| BuildError::Io {
                    path: task.object.clone(),
                    source: e,
                })?;
                Ok((task.fingerprint, bytes))
            })
            .collect()
    })
}

fn ensure_parent(path: &Path) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| BuildError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}
