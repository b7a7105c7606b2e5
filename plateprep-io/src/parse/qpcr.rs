//! LightCycler style qPCR exports: one line per well with its Cp value.

use csv::{ReaderBuilder, StringRecord};
use ndarray::Array2;
use tracing::debug;

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::{PlateType, Well, WellMatrix, parse_well_label};

use crate::consts::{QPCR_CP_HEADER, QPCR_POSITION_HEADER};

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

///
/// Read the `(well, Cp)` calls of a qPCR export. An empty Cp is a "no call"
/// and comes back as `None`.
///
fn read_cp_calls(contents: &str) -> Result<Vec<(Well, Option<f64>)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut records = reader.records();
    let mut next_record = || -> Result<Option<StringRecord>> {
        records
            .next()
            .transpose()
            .map_err(|e| PlateError::parse(format!("Malformed qPCR export: {}", e)))
    };

    let mut header = next_record()?
        .ok_or_else(|| PlateError::parse("The qPCR export is empty"))?;
    // an optional "Experiment: ..." title line comes before the header
    if header
        .get(0)
        .is_some_and(|f| f.trim_start().starts_with("Experiment"))
    {
        header = next_record()?
            .ok_or_else(|| PlateError::parse("The qPCR export doesn't have a header line"))?;
    }

    let find = |name: &str| header.iter().position(|h| h.trim() == name);
    let (pos_idx, cp_idx) = match (find(QPCR_POSITION_HEADER), find(QPCR_CP_HEADER)) {
        (Some(p), Some(c)) => (p, c),
        _ => {
            let present: Vec<&str> = header.iter().map(|h| h.trim()).collect();
            return Err(PlateError::parse(format!(
                "The '{}' and '{}' headers are required. The ones present are: [{}]",
                QPCR_CP_HEADER,
                QPCR_POSITION_HEADER,
                present.join(", ")
            )));
        }
    };

    let mut calls = Vec::new();
    while let Some(record) = next_record()? {
        let line = record_line(&record);
        let pos = record.get(pos_idx).map(str::trim).unwrap_or("");
        if pos.is_empty() {
            return Err(PlateError::parse(format!(
                "Missing well position on line {}",
                line
            )));
        }
        let well = parse_well_label(pos).map_err(|e| {
            PlateError::parse(format!("{} on line {}", e, line))
        })?;

        let cp = match record.get(cp_idx).map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse::<f64>().map_err(|_| {
                PlateError::parse(format!(
                    "Unparseable Cp value {:?} for well {} on line {}",
                    value, pos, line
                ))
            })?),
        };
        calls.push((well, cp));
    }

    if calls.is_empty() {
        return Err(PlateError::parse("The qPCR export doesn't contain any wells"));
    }
    Ok(calls)
}

/// Place the calls on a `shape` matrix. The second matrix flags the wells
/// the export listed.
fn place_calls(
    calls: Vec<(Well, Option<f64>)>,
    shape: (usize, usize),
) -> Result<(WellMatrix<Option<f64>>, Array2<bool>)> {
    let mut cp: WellMatrix<Option<f64>> = Array2::from_elem(shape, None);
    let mut seen: Array2<bool> = Array2::from_elem(shape, false);

    for (well, value) in calls {
        if well.row >= shape.0 || well.col >= shape.1 {
            return Err(PlateError::parse(format!(
                "Well {} is outside of a {}x{} plate",
                well.label()?,
                shape.0,
                shape.1
            )));
        }
        if seen[well.index()] {
            return Err(PlateError::parse(format!(
                "Well {} appears more than once in the qPCR export",
                well.label()?
            )));
        }
        seen[well.index()] = true;
        cp[well.index()] = value;
    }
    Ok((cp, seen))
}

///
/// Parse a qPCR export into a Cp matrix. The shape of the matrix is inferred
/// from the largest row letter and column present in the file, and every well
/// of that matrix must have a line in the export.
///
/// # Arguments
/// - contents: the raw text of the export
///
pub fn parse_qpcr_cp(contents: &str) -> Result<WellMatrix<Option<f64>>> {
    let calls = read_cp_calls(contents)?;
    let rows = calls.iter().map(|(w, _)| w.row).max().unwrap_or(0) + 1;
    let cols = calls.iter().map(|(w, _)| w.col).max().unwrap_or(0) + 1;
    debug!("parsed {} qPCR calls into a {}x{} matrix", calls.len(), rows, cols);
    let (cp, seen) = place_calls(calls, (rows, cols))?;

    if let Some(((row, col), _)) = seen.indexed_iter().find(|(_, listed)| !**listed) {
        return Err(PlateError::parse(format!(
            "Well {} is missing from the qPCR export",
            Well::new(row, col).label()?
        )));
    }
    Ok(cp)
}

///
/// Parse a qPCR export into a Cp matrix sized for `plate_type`.
///
/// The export may cover only part of the plate, e.g. a partial run of a 384
/// well plate. Wells it doesn't list are `None`, the same as a "no call".
///
pub fn parse_qpcr_cp_for_plate(
    contents: &str,
    plate_type: &PlateType,
) -> Result<WellMatrix<Option<f64>>> {
    let calls = read_cp_calls(contents)?;
    let (cp, _) = place_calls(calls, plate_type.shape())?;
    Ok(cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const QPCR_OBJECT: &str = "Experiment: Knight_kapa_qpcr  Selected Filter: SYBR Green I / HRM Dye (465-510),,,,,,,
Include,Color,Pos,Name,Cp,Concentration,Standard,Status
True,255,A1,Sample 1,10.73,,0,
True,255,A2,Sample 2,7.3,,0,
True,255,A3,Sample 3,6.77,,0,
True,255,B1,Sample 25,6.61,,0,
True,65280,B2,Sample 26,,,0,
True,255,B3,Sample 27,12.11,,0,
";

    #[rstest]
    fn test_parse_qpcr_cp() {
        let obs = parse_qpcr_cp(QPCR_OBJECT).unwrap();
        assert_eq!(obs.dim(), (2, 3));
        assert_eq!(obs[[0, 0]], Some(10.73));
        assert_eq!(obs[[1, 2]], Some(12.11));
        assert_eq!(obs[[1, 1]], None);
    }

    #[rstest]
    fn test_parse_qpcr_cp_for_plate() {
        let obs = parse_qpcr_cp_for_plate(QPCR_OBJECT, &PlateType::well_384()).unwrap();
        assert_eq!(obs.dim(), (16, 24));
        assert_eq!(obs[[0, 1]], Some(7.3));
        assert_eq!(obs[[15, 23]], None);
    }

    #[rstest]
    #[case("Pos,Cp\nA1,7.5\nA2,8.0\nB1,7.9\n", "Well B2 is missing from the qPCR export")]
    #[case("Pos,Cp\nA1,7.5\nA3,8.0\n", "Well A2 is missing from the qPCR export")]
    fn test_unlisted_well(#[case] contents: &str, #[case] expected: &str) {
        let err = parse_qpcr_cp(contents).unwrap_err();
        assert!(matches!(err, PlateError::Parse(_)));
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn test_unlisted_well_on_sized_plate() {
        let contents = "Pos,Cp\nA1,7.5\nA2,8.0\nB1,7.9\n";
        let obs = parse_qpcr_cp_for_plate(contents, &PlateType::well_96()).unwrap();
        assert_eq!(obs.dim(), (8, 12));
        assert_eq!(obs[[1, 0]], Some(7.9));
        assert_eq!(obs[[1, 1]], None);
    }

    #[rstest]
    #[case(
        "Include,Color,Pos,Name,CpError,Concentration,Standard,Status\nTrue,255,A1,Sample 1,10.73,,0,\n",
        "The 'Cp' and 'Pos' headers are required. The ones present are: [Include, Color, Pos, Name, CpError, Concentration, Standard, Status]"
    )]
    #[case(
        "Experiment: x,,\nInclude,Color,PosError,Name,Cp,Concentration,Standard,Status\nTrue,255,A1,Sample 1,10.73,,0,\n",
        "The 'Cp' and 'Pos' headers are required. The ones present are: [Include, Color, PosError, Name, Cp, Concentration, Standard, Status]"
    )]
    fn test_missing_headers(#[case] contents: &str, #[case] expected: &str) {
        let err = parse_qpcr_cp(contents).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn test_unparseable_cp() {
        let contents = "Pos,Cp\nA1,7.5\nA2,abc\n";
        let err = parse_qpcr_cp(contents).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unparseable Cp value \"abc\" for well A2 on line 3"
        );
    }

    #[rstest]
    fn test_duplicate_well() {
        let contents = "Pos,Cp\nA1,7.5\nA1,8.0\n";
        assert!(matches!(parse_qpcr_cp(contents), Err(PlateError::Parse(_))));
    }

    #[rstest]
    fn test_well_outside_plate() {
        let contents = "Pos,Cp\nQ1,7.5\n";
        let err = parse_qpcr_cp_for_plate(contents, &PlateType::well_384()).unwrap_err();
        assert_eq!(err.to_string(), "Well Q1 is outside of a 16x24 plate");
    }
}
