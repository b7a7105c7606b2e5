use clap::{Arg, Command};

use crate::common::output_arg;

pub const CONDENSE_CMD: &str = "condense";

pub fn create_condense_cli() -> Command {
    Command::new(CONDENSE_CMD)
        .about("Condense up to four 96-well sample layouts into one 384-well layout.")
        .arg(
            Arg::new("layouts")
                .required(true)
                .num_args(1..=4)
                .help("Layout CSVs, 8 rows of 12 sample ids each, in quadrant order"),
        )
        .arg(output_arg())
}
