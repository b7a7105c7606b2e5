use std::fs;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::info;

use plateprep_engine::consts::UL_TO_NL;
use plateprep_engine::pooling::{
    compute_qpcr_concentration_calls, compute_shotgun_pooling_values_eqvol,
    compute_shotgun_pooling_values_qpcr, estimate_pool_conc_vol,
};
use plateprep_io::format::{format_epmotion_file, format_pooling_echo_pick_list};
use plateprep_io::parse::{parse_qpcr_cp, parse_qpcr_cp_for_plate};

use crate::common::{load_config, plate_type, read_input, write_output};

pub fn run_pool(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let plate_type = plate_type(matches)?;

    let export = read_input(matches, "cp")?;
    let cp = match plate_type {
        Some(plate_type) => parse_qpcr_cp_for_plate(&export, &plate_type)?,
        None => parse_qpcr_cp(&export)?,
    };
    let concentrations = compute_qpcr_concentration_calls(&cp, &config.qpcr)?;

    let volumes = if matches.get_flag("equal-volume") {
        compute_shotgun_pooling_values_eqvol(&concentrations, config.pooling.equal_volume_total)?
            .sample
    } else {
        compute_shotgun_pooling_values_qpcr(&concentrations, None, &config.pooling.params)?
    };

    let estimate = estimate_pool_conc_vol(&volumes, &concentrations)?;
    info!(
        "estimated pool: {:.3} nM in {:.1} nL",
        estimate.concentration, estimate.volume
    );
    if let Some(path) = matches.get_one::<String>("estimate") {
        fs::write(path, serde_json::to_string_pretty(&estimate)?)
            .with_context(|| format!("Failed to write {}", path))?;
    }

    let contents = match matches.get_one::<u32>("epmotion") {
        // the EPMotion works in uL
        Some(destination) => format_epmotion_file(&volumes.mapv(|v| v / UL_TO_NL), *destination)?,
        None => format_pooling_echo_pick_list(&volumes)?,
    };
    write_output(matches, &contents)
}
