//! Robot pick lists and sequencer sample sheets.
//!
//! Formatters are stateless: they take matrices and records and return the
//! file contents. Lines are joined with `\n`, and transfers smaller than
//! [MIN_TRANSFER_VOLUME](crate::consts::MIN_TRANSFER_VOLUME) are left out.

pub mod echo;
pub mod epmotion;
pub mod sample_sheet;

use plateprep_core::errors::Result;
use plateprep_core::geometry::{Well, WellMatrix};

use crate::consts::MIN_TRANSFER_VOLUME;

pub use self::echo::{
    format_index_echo_pick_list, format_normalization_echo_pick_list,
    format_pooling_echo_pick_list,
};
pub use self::epmotion::format_epmotion_file;
pub use self::sample_sheet::format_sample_sheet;

///
/// Wells worth a transfer, in row-major order, with their canonical label.
///
pub(crate) fn transfers(volumes: &WellMatrix<f64>) -> Result<Vec<(String, f64)>> {
    volumes
        .indexed_iter()
        .filter(|(_, v)| **v >= MIN_TRANSFER_VOLUME)
        .map(|((row, col), v)| Ok((Well::new(row, col).label()?, *v)))
        .collect()
}
