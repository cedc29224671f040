//! Local-include dependency discovery for C/C++ translation units.
//!
//! This crate walks quoted `#include` directives starting from an entry source
//! file, resolves each header to a sibling implementation file, and produces
//! one [`Source`] node per reachable translation unit. It also hosts the
//! static makefile emitter, a pure serialization of the discovered unit set.

#![warn(missing_docs)]

pub mod discover;
pub mod error;
pub mod makefile;
pub mod source;

pub use discover::{discover, file_set, SourceMap};
pub use error::DiscoverError;
pub use makefile::generate_makefile;
pub use source::Source;
