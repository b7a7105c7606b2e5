use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use csv::{ReaderBuilder, WriterBuilder};

use plateprep_core::geometry::{PlateType, Quadrant, WellMatrix, matrix_from_rows};
use plateprep_core::utils::read_export;
use plateprep_engine::condense::condense_96_to_384;

use crate::common::write_output;

type Layout = WellMatrix<Option<String>>;

fn read_layout(path: &Path) -> Result<Layout> {
    let contents = read_export(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|f| f.trim())
                .map(|f| (!f.is_empty()).then(|| f.to_string()))
                .collect(),
        );
    }
    let layout = matrix_from_rows(rows)?;
    PlateType::well_96().check_shape(&layout, "layout")?;
    Ok(layout)
}

fn format_layout(layout: &Layout) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in layout.rows() {
        writer.write_record(row.iter().map(|w| w.as_deref().unwrap_or("")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush the condensed layout: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn run_condense(matches: &ArgMatches) -> Result<()> {
    let paths: Vec<&String> = matches
        .get_many::<String>("layouts")
        .context("At least one layout is required")?
        .collect();

    let layouts = paths
        .iter()
        .map(|p| read_layout(Path::new(p)).with_context(|| format!("Failed to read layout {}", p)))
        .collect::<Result<Vec<Layout>>>()?;
    let sources = layouts
        .iter()
        .enumerate()
        .map(|(idx, layout)| Ok((Quadrant::new(idx)?, layout)))
        .collect::<Result<Vec<(Quadrant, &Layout)>>>()?;

    let condensed = condense_96_to_384(&sources)?.mapv(Option::flatten);
    write_output(matches, &format_layout(&condensed)?)
}
