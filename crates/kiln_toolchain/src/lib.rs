//! External compiler and linker invocation.
//!
//! The toolchain is an opaque collaborator: it takes a flag list and produces
//! a file. Two operations exist, compiling one translation unit to an object
//! file and linking an ordered object list into a binary. Any non-zero exit
//! is a hard failure of the whole run; there are no retries.

#![warn(missing_docs)]

use std::path::Path;
use std::process::Command;

/// Errors from invoking the external toolchain.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// The command could not be spawned at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// The command line that failed to start.
        command: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },

    /// The command ran and exited non-zero.
    #[error("`{command}` exited with {status}:\n{stderr}")]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// The exit status description.
        status: String,
        /// Captured standard error output.
        stderr: String,
    },
}

/// The compile-and-link interface the build scheduler drives.
///
/// A trait so the scheduler can be exercised without a real compiler on the
/// machine; production code uses [`SystemToolchain`].
pub trait Toolchain: Sync {
    /// Compiles a single source file to an object file.
    fn compile(&self, cflags: &[String], source: &Path, object: &Path)
        -> Result<(), ToolchainError>;

    /// Links an ordered list of object files into a binary.
    fn link(
        &self,
        cflags: &[String],
        ldflags: &[String],
        objects: &[std::path::PathBuf],
        output: &Path,
    ) -> Result<(), ToolchainError>;
}

/// Invokes a real compiler driver found on `PATH`.
pub struct SystemToolchain {
    driver: String,
}

impl SystemToolchain {
    /// Creates a toolchain using the given compiler driver (e.g. `g++`).
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
        }
    }

    fn run(&self, args: Vec<String>) -> Result<(), ToolchainError> {
        let command_line = std::iter::once(self.driver.as_str())
            .chain(args.iter().map(|a| a.as_str()))
            .collect::<Vec<_>>()
            .join(" ");

        let output = Command::new(&self.driver)
            .args(&args)
            .output()
            .map_err(|e| ToolchainError::Spawn {
                command: command_line.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ToolchainError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

impl Default for SystemToolchain {
    /// The conventional C++ driver.
    fn default() -> Self {
        Self::new("g++")
    }
}

impl Toolchain for SystemToolchain {
    fn compile(
        &self,
        cflags: &[String],
        source: &Path,
        object: &Path,
    ) -> Result<(), ToolchainError> {
        let mut args = vec!["-c".to_string()];
        args.extend(cflags.iter().cloned());
        args.push("-o".to_string());
        args.push(object.display().to_string());
        args.push(source.display().to_string());
        self.run(args)
    }

    fn link(
        &self,
        cflags: &[String],
        ldflags: &[String],
        objects: &[std::path::PathBuf],
        output: &Path,
    ) -> Result<(), ToolchainError> {
        let mut args: Vec<String> = cflags.to_vec();
        args.extend(ldflags.iter().cloned());
        args.push("-o".to_string());
        args.push(output.display().to_string());
        args.extend(objects.iter().map(|o| o.display().to_string()));
        self.run(args)
    }
}
