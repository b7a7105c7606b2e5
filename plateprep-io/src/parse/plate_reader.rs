//! Fluorescence plate reader exports (PicoGreen and Qubit style).

use plateprep_core::consts::MAX_ROWS;
use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::{WellMatrix, matrix_from_rows};
use tracing::debug;

fn parse_value(value: &str, line_no: usize) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| {
        PlateError::parse(format!(
            "Unparseable concentration {:?} on line {}",
            value, line_no
        ))
    })
}

///
/// Parse a single-frame plate reader export.
///
/// The first line holds the fitted curve, followed by blank lines and a
/// whitespace delimited matrix with one line per plate row.
///
/// # Arguments
/// - contents: the raw text of the export
///
pub fn parse_plate_reader_output(contents: &str) -> Result<WellMatrix<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with("Curve") {
            continue;
        }

        let values = line
            .split_whitespace()
            .map(|v| parse_value(v, line_no))
            .collect::<Result<Vec<f64>>>()?;

        if let Some(first) = rows.first() {
            if first.len() != values.len() {
                return Err(PlateError::parse(format!(
                    "Line {} has {} values but the first row of the plate has {}",
                    line_no,
                    values.len(),
                    first.len()
                )));
            }
        }
        rows.push(values);
    }

    if rows.is_empty() {
        return Err(PlateError::parse(
            "The plate reader output doesn't contain any concentration rows",
        ));
    }

    debug!(
        "parsed plate reader output with {} rows and {} columns",
        rows.len(),
        rows[0].len()
    );
    matrix_from_rows(rows)
}

/// The first line of a frame numbers the columns: an empty cell, then 1 to N.
fn check_column_header(fields: &[&str], frame_no: usize) -> Result<()> {
    let numbered = fields[0].trim().is_empty()
        && fields[1..]
            .iter()
            .enumerate()
            .all(|(i, f)| f.trim().parse::<usize>() == Ok(i + 1));
    if !numbered {
        return Err(PlateError::parse(format!(
            "The first line of frame {} should number the columns 1 to {}, got: [{}]",
            frame_no,
            fields.len() - 1,
            fields.join(", ")
        )));
    }
    Ok(())
}

///
/// Parse a plate reader export holding several plates ("frames").
///
/// Frames are separated by blank lines. The first line of a frame is the
/// column header (`<tab>1<tab>2...`), and every other line starts with its
/// row letter followed by one tab separated value per column:
///
/// ```text
///     1       2       3
/// A   145.598 150.047 144.486
/// B   141.149 204.549 186.752
/// ```
///
/// Every line of every frame must have the same number of tab separated
/// fields as the first line of the file, and row letters must appear in order.
///
pub fn parse_plate_reader_output_multiple(contents: &str) -> Result<Vec<WellMatrix<f64>>> {
    let mut frames: Vec<Vec<Vec<&str>>> = Vec::new();
    let mut current: Vec<Vec<&str>> = Vec::new();

    for line in contents.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                frames.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line.split('\t').collect());
    }
    if !current.is_empty() {
        frames.push(current);
    }

    let expected = frames
        .first()
        .and_then(|f| f.first())
        .map(|header| header.len())
        .ok_or_else(|| PlateError::parse("The plate reader output doesn't contain any plate"))?;

    let mut plates = Vec::with_capacity(frames.len());
    for (frame_idx, frame) in frames.iter().enumerate() {
        let frame_no = frame_idx + 1;
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(frame.len().saturating_sub(1));

        for (line_idx, fields) in frame.iter().enumerate() {
            if fields.len() != expected {
                return Err(PlateError::parse(format!(
                    "We expect {} columns in all lines but line {} of frame {} only has {}: [{}]",
                    expected,
                    line_idx,
                    frame_no,
                    fields.len(),
                    fields.join(", ")
                )));
            }

            if line_idx == 0 {
                check_column_header(fields, frame_no)?;
                continue;
            }

            if line_idx > MAX_ROWS {
                return Err(PlateError::parse(format!(
                    "Frame {} has more than {} rows",
                    frame_no, MAX_ROWS
                )));
            }
            let expected_row = (b'A' + (line_idx - 1) as u8) as char;
            let row_value = fields[0].trim();
            if row_value != expected_row.to_string() {
                return Err(PlateError::parse(format!(
                    "Wrong row value: {}, it should be: {}, on line {}, of frame {}",
                    row_value, expected_row, line_idx, frame_no
                )));
            }

            let values = fields[1..]
                .iter()
                .map(|v| {
                    v.trim().parse::<f64>().map_err(|_| {
                        PlateError::parse(format!(
                            "Unparseable concentration {:?} on line {}, of frame {}",
                            v, line_idx, frame_no
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(values);
        }

        if rows.is_empty() {
            return Err(PlateError::parse(format!(
                "Frame {} doesn't contain any rows",
                frame_no
            )));
        }
        plates.push(matrix_from_rows(rows)?);
    }

    debug!("parsed {} plates from plate reader output", plates.len());
    Ok(plates)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn picogreen() -> &'static str {
        "Curve0.5\tY=A*X+B\t1.15E+003\t99.8\t0.773\t?????\n\n\
         0.154\t0.680\t0.440\n\
         0.064\t15.243\t0.156\n"
    }

    #[rstest]
    fn test_parse_plate_reader_output(picogreen: &str) {
        let obs = parse_plate_reader_output(picogreen).unwrap();
        assert_eq!(obs.dim(), (2, 3));
        assert_eq!(obs[[0, 1]], 0.680);
        assert_eq!(obs[[1, 1]], 15.243);
    }

    #[rstest]
    fn test_parse_plate_reader_output_ragged() {
        let err = parse_plate_reader_output("1.0\t2.0\n3.0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 2 has 1 values but the first row of the plate has 2"
        );
    }

    #[rstest]
    fn test_parse_plate_reader_output_garbage() {
        let err = parse_plate_reader_output("1.0\tx\n").unwrap_err();
        assert!(matches!(err, PlateError::Parse(_)));
        assert!(err.to_string().contains("line 1"));
    }

    #[rstest]
    fn test_parse_plate_reader_output_empty() {
        assert!(parse_plate_reader_output("Curve0.5\n\n").is_err());
    }

    #[rstest]
    fn test_parse_multiple_frames() {
        let contents = "\t1\t2\nA\t1.5\t2.5\nB\t3.5\t4.5\n\n\t1\t2\nA\t5\t6\nB\t7\t8\n";
        let plates = parse_plate_reader_output_multiple(contents).unwrap();
        assert_eq!(plates.len(), 2);
        assert_eq!(plates[0][[1, 0]], 3.5);
        assert_eq!(plates[1][[1, 1]], 8.0);
    }

    #[rstest]
    fn test_parse_multiple_frames_short_line() {
        let contents = "\t1\t2\nA\t1.5\t2.5\n\n\t1\t2\nA\t5\n";
        let err = parse_plate_reader_output_multiple(contents).unwrap_err();
        assert_eq!(
            err.to_string(),
            "We expect 3 columns in all lines but line 1 of frame 2 only has 2: [A, 5]"
        );
    }

    #[rstest]
    fn test_parse_multiple_frames_wrong_row() {
        let contents = "\t1\t2\nA\t1.5\t2.5\nG\t3.5\t4.5\n";
        let err = parse_plate_reader_output_multiple(contents).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong row value: G, it should be: B, on line 2, of frame 1"
        );
    }

    #[rstest]
    #[case::no_header("A\t1.5\t2.5\nB\t3.5\t4.5\n", 1, "A, 1.5, 2.5")]
    #[case::out_of_order("\t1\t2\nA\t1.5\t2.5\n\n\t2\t1\nA\t5\t6\n", 2, ", 2, 1")]
    fn test_parse_multiple_frames_bad_header(
        #[case] contents: &str,
        #[case] frame_no: usize,
        #[case] shown: &str,
    ) {
        let err = parse_plate_reader_output_multiple(contents).unwrap_err();
        assert!(matches!(err, PlateError::Parse(_)));
        assert_eq!(
            err.to_string(),
            format!(
                "The first line of frame {} should number the columns 1 to 2, got: [{}]",
                frame_no, shown
            )
        );
    }
}
