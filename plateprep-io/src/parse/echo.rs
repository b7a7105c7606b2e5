//! Echo transfer reports.
//!
//! A report starts with a `key,value` run header, followed by an
//! `[EXCEPTIONS]` and a `[DETAILS]` section. Each section is a CSV table with
//! its own header line.

use csv::ReaderBuilder;
use tracing::debug;

use plateprep_core::errors::{PlateError, Result};

use crate::consts::{ECHO_DETAILS_SECTION, ECHO_EXCEPTIONS_SECTION, ECHO_RUN_ID_KEY};

/// One section of an Echo report. Empty fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EchoTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl EchoTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    ///
    /// Value of column `name` on row `row`, `None` when the row, the column or
    /// the value is missing.
    ///
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.get(idx).and_then(|v| v.as_deref()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoReport {
    pub header: Vec<(String, String)>,
    pub exceptions: EchoTable,
    pub details: EchoTable,
}

impl EchoReport {
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.header
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn run_id(&self) -> Option<&str> {
        self.header_value(ECHO_RUN_ID_KEY)
    }
}

/// `[DETAILS],,,` and `[DETAILS]` both mark a section.
fn section_marker(line: &str) -> Option<&str> {
    let marker = line.trim().trim_end_matches(',').trim();
    if marker.starts_with('[') && marker.ends_with(']') {
        Some(marker)
    } else {
        None
    }
}

fn clean_field(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

///
/// Parse the CSV body of one section. `first_line` is the 1-based line number
/// of the section's first line inside the report, used in error messages.
///
fn parse_section(name: &str, lines: &[&str], first_line: usize) -> Result<EchoTable> {
    let body = lines.join("\n");
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut table = EchoTable::default();
    for record in reader.records() {
        let record = record
            .map_err(|e| PlateError::parse(format!("Malformed {} section: {}", name, e)))?;
        let line_no = first_line + record.position().map(|p| p.line() as usize).unwrap_or(1) - 1;

        if table.columns.is_empty() {
            table.columns = record.iter().map(|c| c.trim().to_string()).collect();
            // trailing empty header fields come from spreadsheet exports
            while table.columns.last().is_some_and(|c| c.is_empty()) {
                table.columns.pop();
            }
            continue;
        }

        let mut row: Vec<Option<String>> = record.iter().map(clean_field).collect();
        while row.len() > table.columns.len() && row.last().is_some_and(|v| v.is_none()) {
            row.pop();
        }
        if row.len() > table.columns.len() {
            return Err(PlateError::parse(format!(
                "Line {} of the {} section has {} fields but the section has {} columns",
                line_no,
                name,
                row.len(),
                table.columns.len()
            )));
        }
        row.resize(table.columns.len(), None);
        table.rows.push(row);
    }
    Ok(table)
}

///
/// Parse an Echo transfer report.
///
/// The run header, the `[EXCEPTIONS]` section and the `[DETAILS]` section are
/// all required; a missing one is reported as a parse error naming it.
///
/// # Arguments
/// - contents: the raw text of the report
///
pub fn parse_echo_report(contents: &str) -> Result<EchoReport> {
    let lines: Vec<&str> = contents.lines().map(|l| l.trim_end_matches('\r')).collect();

    let mut header = Vec::new();
    let mut sections: Vec<(&str, usize)> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(marker) = section_marker(line) {
            sections.push((marker, idx));
            continue;
        }
        if sections.is_empty() && !line.trim().is_empty() {
            let (key, value) = line.split_once(',').unwrap_or((line, ""));
            header.push((
                key.trim().to_string(),
                value.trim().trim_end_matches(',').trim().to_string(),
            ));
        }
    }

    if !header.iter().any(|(k, _)| k == ECHO_RUN_ID_KEY) {
        return Err(PlateError::parse(format!(
            "The Echo report doesn't have a run header (no '{}' line)",
            ECHO_RUN_ID_KEY
        )));
    }

    let section = |name: &str| -> Result<EchoTable> {
        let pos = sections
            .iter()
            .position(|(marker, _)| *marker == name)
            .ok_or_else(|| {
                PlateError::parse(format!("The Echo report doesn't have a {} section", name))
            })?;
        let start = sections[pos].1 + 1;
        let end = sections.get(pos + 1).map(|(_, idx)| *idx).unwrap_or(lines.len());
        parse_section(name, &lines[start..end], start + 1)
    };

    let exceptions = section(ECHO_EXCEPTIONS_SECTION)?;
    let details = section(ECHO_DETAILS_SECTION)?;
    debug!(
        "parsed Echo report with {} exceptions and {} transfers",
        exceptions.len(),
        details.len()
    );

    Ok(EchoReport {
        header,
        exceptions,
        details,
    })
}
