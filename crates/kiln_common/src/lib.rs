//! Shared foundational types for the kiln build cache.
//!
//! This crate provides the content hashing value type used both for per-file
//! change detection and as the binary fingerprint key of the build cache.

#![warn(missing_docs)]

pub mod hash;

pub use hash::{ContentHash, HashBuilder};
