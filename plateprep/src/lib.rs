//! Sequencing prep plate tracking.
//!
//! This crate only re-exports the workspace crates behind feature flags:
//! - `core`: plate geometry, domain records and the plate store
//! - `io`: instrument export parsers and robot pick-list formatters
//! - `engine`: condensing, normalization, pooling, index assignment and the
//!   lineage transitions

#[cfg(feature = "core")]
#[doc(inline)]
pub use plateprep_core as core;

#[cfg(feature = "io")]
#[doc(inline)]
pub use plateprep_io as io;

#[cfg(feature = "engine")]
#[doc(inline)]
pub use plateprep_engine as engine;
