//! The persistent, content-addressed build cache.
//!
//! This crate provides file-content fingerprinting, the per-unit cache key
//! digest, and a durable key→artifact store with last-used bookkeeping.
//! Store failures are fatal for the run: they are never downgraded to cache
//! misses, because a miss would mask a real storage problem behind redundant
//! recompilation.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod hasher;
pub mod key;
pub mod store;

pub use cache::BuildCache;
pub use error::CacheError;
pub use hasher::SourceHasher;
pub use key::unit_fingerprint;
