//! The parallel build scheduler.
//!
//! For every compilable unit the scheduler computes a fingerprint, queries
//! the build cache, and either restores the cached object bytes or defers a
//! compile task to a bounded worker pool. Workers only invoke the external
//! compiler; all cache mutation happens in the coordinator after the pool
//! drains. A final link step produces the requested binary.

#![warn(missing_docs)]

pub mod error;
pub mod scheduler;

pub use error::BuildError;
pub use scheduler::{build, BuildOptions, BuildReport};
