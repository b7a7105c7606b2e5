//! Core data model for plateprep.
//!
//! - [geometry]: well addressing, plate types and quadrant interleaving
//! - [models]: plate lineage records, pools and sequencing runs
//! - [store]: the persistence seam every transformation goes through
//! - [errors]: the error taxonomy shared by all plateprep crates

pub mod consts;
pub mod errors;
pub mod geometry;
pub mod models;
pub mod store;
pub mod utils;

// re-exports
pub use errors::{PlateError, Result};
pub use geometry::{
    PlateType, Quadrant, Well, WellMatrix, check_same_shape, matrix_from_rows, parse_well_label,
    well_label,
};
pub use store::{MemoryPlateStore, PlateStore};
