//! Parsers for instrument exports.
//!
//! Every parser takes the text of the export. Use
//! [read_export](plateprep_core::utils::read_export) to load a file (gzipped
//! or not) first.

pub mod echo;
pub mod plate_reader;
pub mod qpcr;

pub use self::echo::{EchoReport, EchoTable, parse_echo_report};
pub use self::plate_reader::{parse_plate_reader_output, parse_plate_reader_output_multiple};
pub use self::qpcr::{parse_qpcr_cp, parse_qpcr_cp_for_plate};
