//! Arguments and I/O shared by every subcommand.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, arg, value_parser};
use tracing::info;

use plateprep_core::geometry::PlateType;
use plateprep_core::utils::read_export;
use plateprep_engine::ProtocolConfig;

pub fn config_arg() -> Arg {
    arg!(--config <config> "Protocol configuration (TOML). Built-in defaults are used when omitted.")
}

pub fn output_arg() -> Arg {
    arg!(--output <output> "Where to write the result. Defaults to stdout.")
}

pub fn wells_arg() -> Arg {
    arg!(--wells <wells> "Number of wells of the plate. Inferred from the wells of the export when omitted.")
        .value_parser(["96", "384"])
}

pub fn input_dna_arg() -> Arg {
    arg!(--"input-dna" <ng> "ng of DNA to normalize every well to, overrides the configuration")
        .value_parser(value_parser!(f64))
}

pub fn load_config(matches: &ArgMatches) -> Result<ProtocolConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => ProtocolConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load the protocol configuration {}", path)),
        None => Ok(ProtocolConfig::default()),
    }
}

pub fn plate_type(matches: &ArgMatches) -> Result<Option<PlateType>> {
    match matches.get_one::<String>("wells").map(String::as_str) {
        Some("96") => Ok(Some(PlateType::well_96())),
        Some("384") => Ok(Some(PlateType::well_384())),
        Some(other) => anyhow::bail!("Unsupported plate size: {}", other),
        None => Ok(None),
    }
}

///
/// Read the file given as positional argument `name`. Gzipped files are
/// decompressed.
///
pub fn read_input(matches: &ArgMatches, name: &str) -> Result<String> {
    let path = matches
        .get_one::<String>(name)
        .with_context(|| format!("A path for {} is required", name))?;
    read_export(Path::new(path)).with_context(|| format!("Failed to read {}", path))
}

pub fn write_output(matches: &ArgMatches, contents: &str) -> Result<()> {
    match matches.get_one::<String>("output") {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("Failed to write {}", path))?;
            info!("wrote {}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}
