//! Echo pick lists. All of them share [ECHO_HEADER].

use plateprep_core::errors::Result;
use plateprep_core::geometry::{Well, WellMatrix, check_same_shape};
use plateprep_core::models::IndexPair;

use crate::consts::*;
use crate::format::transfers;

fn echo_row(
    source_plate: &str,
    source_well: &str,
    volume: &str,
    destination_plate: &str,
    destination_well: &str,
) -> String {
    format!(
        "{},{},{},,{},{},{}",
        source_plate,
        ECHO_SOURCE_PLATE_TYPE,
        source_well,
        volume,
        destination_plate,
        destination_well
    )
}

///
/// Render the Echo pick list that normalizes a plate: every water transfer
/// first, then every sample transfer, each into the same well of the
/// normalized plate.
///
/// # Arguments
/// - sample_volume: nL of sample per well
/// - water_volume: nL of water per well
///
pub fn format_normalization_echo_pick_list(
    sample_volume: &WellMatrix<f64>,
    water_volume: &WellMatrix<f64>,
) -> Result<String> {
    check_same_shape(sample_volume, water_volume, "sample volume", "water volume")?;

    let mut contents = vec![ECHO_HEADER.to_string()];
    for (plate, volumes) in [
        (ECHO_WATER_PLATE, water_volume),
        (ECHO_SAMPLE_PLATE, sample_volume),
    ] {
        for (well, vol) in transfers(volumes)? {
            contents.push(echo_row(
                plate,
                &well,
                &format!("{:.2}", vol),
                ECHO_NORMALIZED_PLATE,
                &well,
            ));
        }
    }
    Ok(contents.join("\n"))
}

///
/// Render the Echo pick list pooling a whole plate into a single well.
///
pub fn format_pooling_echo_pick_list(volumes: &WellMatrix<f64>) -> Result<String> {
    let mut contents = vec![ECHO_HEADER.to_string()];
    for (well, vol) in transfers(volumes)? {
        contents.push(echo_row(
            ECHO_SAMPLE_PLATE,
            &well,
            &format!("{:.2}", vol),
            ECHO_NORMALIZED_PLATE,
            ECHO_POOL_DESTINATION,
        ));
    }
    Ok(contents.join("\n"))
}

///
/// Render the Echo pick list adding index primers to a library plate.
///
/// All i7 transfers come before the i5 transfers. Wells without an index pair
/// get nothing.
///
/// # Arguments
/// - indices: the index pair assigned to each well
/// - volume: the volume of each primer to transfer
///
pub fn format_index_echo_pick_list(
    indices: &WellMatrix<Option<IndexPair>>,
    volume: f64,
) -> Result<String> {
    let mut contents = vec![ECHO_HEADER.to_string()];
    if volume < MIN_TRANSFER_VOLUME {
        return Ok(contents.join("\n"));
    }

    let volume = format!("{:.3}", volume);
    let assigned: Vec<(String, &IndexPair)> = indices
        .indexed_iter()
        .filter_map(|((row, col), pair)| pair.as_ref().map(|p| (Well::new(row, col), p)))
        .map(|(well, pair)| Ok((well.label()?, pair)))
        .collect::<Result<_>>()?;

    for (well, pair) in &assigned {
        contents.push(echo_row(
            ECHO_I7_SOURCE_PLATE,
            &pair.i7.source_well.label()?,
            &volume,
            ECHO_INDEXED_PLATE,
            well,
        ));
    }
    for (well, pair) in &assigned {
        contents.push(echo_row(
            ECHO_I5_SOURCE_PLATE,
            &pair.i5.source_well.label()?,
            &volume,
            ECHO_INDEXED_PLATE,
            well,
        ));
    }
    Ok(contents.join("\n"))
}
