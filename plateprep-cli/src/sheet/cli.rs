use clap::{Arg, Command, arg};

use crate::common::output_arg;

pub const SHEET_CMD: &str = "sheet";

pub fn create_sheet_cli() -> Command {
    Command::new(SHEET_CMD)
        .about("Render the sample sheet of a sequencing run.")
        .arg(
            Arg::new("run")
                .required(true)
                .help("TOML description of the run and its samples"),
        )
        .arg(arg!(--date <date> "Date written in the sheet (YYYY-MM-DD). Defaults to today."))
        .arg(output_arg())
}
