use clap::{Arg, Command};

use crate::common::{config_arg, input_dna_arg, output_arg};

pub const NORMALIZE_CMD: &str = "normalize";

pub fn create_normalize_cli() -> Command {
    Command::new(NORMALIZE_CMD)
        .about("Build the Echo pick list normalizing a plate from its plate reader export.")
        .arg(
            Arg::new("export")
                .required(true)
                .help("Plate reader export with the DNA concentrations (ng/uL)"),
        )
        .arg(config_arg())
        .arg(input_dna_arg())
        .arg(output_arg())
}
