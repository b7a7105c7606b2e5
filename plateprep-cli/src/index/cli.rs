use clap::{Arg, Command, arg, value_parser};

use crate::common::{config_arg, input_dna_arg, output_arg};

pub const INDEX_CMD: &str = "index";

pub fn create_index_cli() -> Command {
    Command::new(INDEX_CMD)
        .about("Assign index pairs to the wells of a normalized plate and build the Echo index pick list.")
        .arg(
            Arg::new("export")
                .required(true)
                .help("Plate reader export the plate was normalized from"),
        )
        .arg(arg!(--technology <technology> "Index technology, as named in the configuration").required(true))
        .arg(
            arg!(--start <start> "First index pair to hand out")
                .value_parser(value_parser!(usize))
                .default_value("0"),
        )
        .arg(config_arg())
        .arg(input_dna_arg())
        .arg(output_arg())
}
