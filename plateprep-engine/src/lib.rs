//! # Plate transformation engine
//!
//! The arithmetic of the sequencing preparation pipeline and the transitions
//! that record each derived plate.
//!
//! - [condense]: four 96-well plates into one 384-well plate
//! - [normalize]: sample and water volumes for shotgun normalization
//! - [pooling]: qPCR concentrations, pooling volumes and pool estimates
//! - [indices]: index technologies and per-operation index allocation
//! - [pipeline]: the lineage transitions, through a
//!   [PlateStore](plateprep_core::store::PlateStore)
//! - [config]: protocol defaults read from TOML
//!
//! ```rust
//! use plateprep_engine::pooling::{PoolingParams, compute_shotgun_pooling_values_qpcr};
//! use plateprep_core::geometry::matrix_from_rows;
//!
//! let concs = matrix_from_rows(vec![vec![1.0, 12.0, 400.0], vec![200.0, 40.0, 1.0]]).unwrap();
//! let vols = compute_shotgun_pooling_values_qpcr(&concs, None, &PoolingParams::default()).unwrap();
//! assert_eq!(vols[[0, 0]], 0.0);
//! ```
pub mod condense;
pub mod config;
pub mod consts;
pub mod indices;
pub mod normalize;
pub mod pipeline;
pub mod pooling;

// re-exports
pub use config::{ConfigError, ProtocolConfig};
pub use indices::{IndexAllocator, IndexScheme, IndexTechnology};
pub use normalize::{NormalizationParams, TransferVolumes};
pub use pooling::{PoolEstimate, PoolingParams, StandardCurve};
