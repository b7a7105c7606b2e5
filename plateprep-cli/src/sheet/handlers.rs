use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::ArgMatches;
use serde::Deserialize;

use plateprep_core::models::{
    Contact, InstrumentType, RunId, RunState, RunType, SequencingRun, SheetSample,
};
use plateprep_io::format::format_sample_sheet;

use crate::common::{read_input, write_output};
use crate::consts::{CLI_USER, DATE_FORMAT};

/// A run as written by hand for the `sheet` subcommand.
#[derive(Deserialize, Debug)]
struct RunDescription {
    #[serde(default)]
    id: RunId,
    name: String,
    platform: String,
    run_type: String,
    assay: String,
    fwd_cycles: u32,
    rev_cycles: u32,
    #[serde(default)]
    reagent_kit_type: String,
    #[serde(default)]
    reagent_kit_lot: String,
    principal_investigator: Contact,
    #[serde(default)]
    contacts: Vec<Contact>,
    #[serde(default)]
    samples: Vec<SheetSample>,
}

impl RunDescription {
    fn into_run(self) -> Result<(SequencingRun, Vec<SheetSample>)> {
        let run = SequencingRun {
            id: self.id,
            pool_id: 0,
            name: self.name,
            platform: self.platform.parse::<InstrumentType>()?,
            run_type: self.run_type.parse::<RunType>()?,
            assay: self.assay,
            fwd_cycles: self.fwd_cycles,
            rev_cycles: self.rev_cycles,
            reagent_kit_type: self.reagent_kit_type,
            reagent_kit_lot: self.reagent_kit_lot,
            principal_investigator: self.principal_investigator,
            contacts: self.contacts,
            state: RunState::Pending,
            created_by: CLI_USER.to_string(),
            created_on: Utc::now(),
        };
        Ok((run, self.samples))
    }
}

pub fn run_sheet(matches: &ArgMatches) -> Result<()> {
    let description: RunDescription =
        toml::from_str(&read_input(matches, "run")?).context("Failed to parse the run description")?;
    let (run, samples) = description.into_run()?;

    let date = match matches.get_one::<String>("date") {
        Some(date) => NaiveDate::parse_from_str(date, DATE_FORMAT)
            .with_context(|| format!("{} is not a YYYY-MM-DD date", date))?,
        None => Local::now().date_naive(),
    };

    let contents = format_sample_sheet(&run, &samples, date)?;
    write_output(matches, &contents)
}
