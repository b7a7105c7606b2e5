use anyhow::Result;
use clap::ArgMatches;
use tracing::info;

use plateprep_engine::ProtocolConfig;
use plateprep_engine::normalize::{TransferVolumes, compute_shotgun_normalization_values};
use plateprep_io::format::format_normalization_echo_pick_list;
use plateprep_io::parse::parse_plate_reader_output;

use crate::common::{load_config, read_input, write_output};

///
/// Sample and water volumes for the plate reader export in `export`.
///
pub fn normalized_volumes(matches: &ArgMatches, config: &ProtocolConfig) -> Result<TransferVolumes> {
    let mut params = config.normalization;
    if let Some(input_dna) = matches.get_one::<f64>("input-dna") {
        params.input_dna = *input_dna;
    }

    let concentrations = parse_plate_reader_output(&read_input(matches, "export")?)?;
    info!(
        "normalizing {} wells to {} ng in {} uL",
        concentrations.len(),
        params.input_dna,
        params.input_volume
    );
    Ok(compute_shotgun_normalization_values(
        &concentrations.mapv(Some),
        &params,
    )?)
}

pub fn run_normalize(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let volumes = normalized_volumes(matches, &config)?;
    let contents = format_normalization_echo_pick_list(&volumes.sample, &volumes.water)?;
    write_output(matches, &contents)
}
