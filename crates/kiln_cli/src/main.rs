//! Command-line interface for the kiln build cache.
//!
//! Builds a binary from an entry source file, compiling only translation
//! units whose exact input fingerprint has never been cached, or emits a
//! static dependency makefile instead.

#![warn(missing_docs)]

mod build;

use std::path::PathBuf;
use std::process;

use clap::Parser;

/// An incremental, content-addressed compilation cache.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Incremental compilation cache and build orchestrator")]
pub struct Cli {
    /// Entry source file to build from.
    pub source: PathBuf,

    /// Name of the linked output binary.
    pub binary: PathBuf,

    /// Path to a TOML build configuration file (cflags/ldflags lists).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Cache store location. Defaults to the user-level cache directory.
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Worker pool size for compile tasks. Defaults to available parallelism.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Directory object files are written under.
    #[arg(long, default_value = "build")]
    pub build_dir: PathBuf,

    /// Print a static dependency makefile to stdout instead of building.
    #[arg(long)]
    pub emit_makefile: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Print per-unit cache decisions.
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    match build::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
