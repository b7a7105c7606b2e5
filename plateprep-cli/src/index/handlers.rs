use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::info;

use plateprep_engine::indices::{IndexAllocator, assign_indices};
use plateprep_io::format::format_index_echo_pick_list;

use crate::common::{load_config, write_output};
use crate::normalize::handlers::normalized_volumes;

pub fn run_index(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let name = matches
        .get_one::<String>("technology")
        .context("An index technology is required")?;
    let technology = config.index_technology(name)?;
    let start = matches.get_one::<usize>("start").copied().unwrap_or(0);

    let volumes = normalized_volumes(matches, &config)?;
    let mut allocator = IndexAllocator::new(&technology, start);
    let indices = assign_indices(&volumes.sample, &mut allocator)?;

    let used = indices.iter().flatten().count();
    info!(
        "assigned {} index pairs of {}; the next plate starts at --start {}",
        used,
        technology.name,
        start + used
    );

    let contents = format_index_echo_pick_list(&indices, config.echo.index_volume)?;
    write_output(matches, &contents)
}
