use clap::{Arg, ArgAction, Command, arg, value_parser};

use crate::common::{config_arg, output_arg, wells_arg};

pub const POOL_CMD: &str = "pool";

pub fn create_pool_cli() -> Command {
    Command::new(POOL_CMD)
        .about("Pool the libraries of a plate from its qPCR export.")
        .arg(Arg::new("cp").required(true).help("qPCR export with the Cp of every well"))
        .arg(config_arg())
        .arg(wells_arg())
        .arg(
            arg!(--"equal-volume" "Take the same volume of every well instead of normalizing by molarity")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--epmotion <destination> "Write an EPMotion file for this destination tube rack instead of an Echo pick list")
                .value_parser(value_parser!(u32)),
        )
        .arg(arg!(--estimate <estimate> "Also write the estimated pool molarity and volume as JSON"))
        .arg(output_arg())
}
