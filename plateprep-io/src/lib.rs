//! # Instrument I/O for plateprep
//!
//! Readers for the text exports of plate readers, qPCR machines and Echo
//! liquid handlers, and writers for the files robots and sequencers consume.
//!
//! ```rust,no_run
//! use plateprep_io::parse::parse_plate_reader_output;
//! use plateprep_io::format::format_pooling_echo_pick_list;
//!
//! let concentrations = parse_plate_reader_output("1.5\t2.5\n3.5\t4.5\n").unwrap();
//! let pick_list = format_pooling_echo_pick_list(&concentrations).unwrap();
//! ```
pub mod consts;
pub mod format;
pub mod parse;
