//! The build run: discover, schedule against the cache, link.

use std::path::PathBuf;

use kiln_build::{build, BuildOptions};
use kiln_cache::BuildCache;
use kiln_config::BuildConfig;
use kiln_discover::{discover, generate_makefile};
use kiln_toolchain::SystemToolchain;

use crate::Cli;

/// Runs a kiln invocation. Returns the process exit code.
pub fn run(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => kiln_config::load_config(path)?,
        None => BuildConfig::default(),
    };

    let sources = discover(&cli.source)?;

    if cli.emit_makefile {
        let out = cli.binary.display().to_string();
        println!("{}", generate_makefile(&sources, &out));
        return Ok(0);
    }

    if !cli.quiet {
        let compilable = sources.values().filter(|s| s.target().is_some()).count();
        eprintln!(
            "   Discovered {} units ({} compilable)",
            sources.len(),
            compilable
        );
    }

    let cache_dir = cli.cache.clone().unwrap_or_else(default_cache_dir);
    let mut cache = BuildCache::open(&cache_dir)?;

    let options = BuildOptions {
        build_dir: cli.build_dir.clone(),
        output: cli.binary.clone(),
        jobs: resolve_jobs(cli.jobs),
    };
    let toolchain = SystemToolchain::default();

    let report = build(&sources, &config, &toolchain, &mut cache, &options)?;

    if cli.verbose {
        for unit in &report.hits {
            eprintln!("    cached {}", unit.display());
        }
        for unit in &report.compiled {
            eprintln!("  compiled {}", unit.display());
        }
    }
    if !cli.quiet {
        eprintln!(
            "   {} compiled, {} cached",
            report.compiled.len(),
            report.hits.len()
        );
        eprintln!("   Linked {}", report.binary.display());
    }

    Ok(0)
}

/// The user-level cache directory for kiln.
///
/// Falls back through `$HOME/.cache` to a project-local directory when no
/// platform cache directory is available.
fn default_cache_dir() -> PathBuf {
    if let Some(cache_dir) = dirs::cache_dir() {
        return cache_dir.join("kiln");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cache").join("kiln");
    }
    PathBuf::from(".kiln-cache")
}

/// The worker count: an explicit override, or available parallelism.
fn resolve_jobs(override_jobs: Option<usize>) -> usize {
    match override_jobs {
        Some(jobs) if jobs > 0 => jobs,
        _ => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn default_cache_dir_ends_with_kiln() {
        assert!(default_cache_dir().ends_with("kiln") || default_cache_dir().ends_with(".kiln-cache"));
    }

    #[test]
    fn resolve_jobs_explicit_override() {
        assert_eq!(resolve_jobs(Some(3)), 3);
    }

    #[test]
    fn resolve_jobs_zero_falls_back() {
        assert!(resolve_jobs(Some(0)) >= 1);
    }

    #[test]
    fn resolve_jobs_default_is_positive() {
        assert!(resolve_jobs(None) >= 1);
    }

    #[test]
    fn emit_makefile_writes_no_objects() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("a.cpp");
        std::fs::write(&entry, "int main() {}\n").unwrap();

        let cli = Cli::parse_from([
            "kiln",
            "--emit-makefile",
            "--quiet",
            entry.to_str().unwrap(),
            "app",
        ]);
        let code = run(&cli).unwrap();
        assert_eq!(code, 0);
        assert!(!dir.path().join("build").exists());
    }

    #[test]
    fn missing_entry_file_errors() {
        let cli = Cli::parse_from(["kiln", "/nonexistent/main.cpp", "app"]);
        assert!(run(&cli).is_err());
    }

    #[test]
    fn malformed_config_errors_before_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("kiln.toml");
        std::fs::write(&config, "cflags = not-a-list").unwrap();
        let entry = dir.path().join("a.cpp");
        std::fs::write(&entry, "int main() {}\n").unwrap();

        let cli = Cli::parse_from([
            "kiln",
            "--config",
            config.to_str().unwrap(),
            entry.to_str().unwrap(),
            "app",
        ]);
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
