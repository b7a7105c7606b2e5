//! Interleave up to four 96-well plates into one 384-well plate.

use fxhash::FxHashSet;
use ndarray::Array2;
use tracing::debug;

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::{PlateType, Quadrant, Well, WellMatrix};

///
/// Make sure `source_type -> target_type` is the one condensation we know how
/// to do: four 96-well plates into a 384-well plate.
///
pub fn check_condensable(source_type: &PlateType, target_type: &PlateType) -> Result<()> {
    let (source_rows, source_cols) = PlateType::well_96().shape();
    let (target_rows, target_cols) = PlateType::well_384().shape();

    if target_type.shape() != (target_rows, target_cols) {
        return Err(PlateError::validation(format!(
            "Only {}x{} plates can be built by condensing plates, got a {}x{} {}",
            target_rows, target_cols, target_type.rows, target_type.cols, target_type.name
        )));
    }
    if source_type.shape() != (source_rows, source_cols) {
        return Err(PlateError::validation(format!(
            "Only {}x{} plates can be condensed, got a {}x{} {}",
            source_rows, source_cols, source_type.rows, source_type.cols, source_type.name
        )));
    }
    Ok(())
}

///
/// Condense per-quadrant matrices into a single matrix of `target_type`.
///
/// Source well `(r, c)` of quadrant `q` lands on `(2r + q / 2, 2c + q % 2)`.
/// Wells of missing quadrants are `None`.
///
/// # Arguments
/// - sources: the matrix of each supplied quadrant
/// - source_type: the plate type every source must have
/// - target_type: the plate type of the condensed plate
///
pub fn condense<T: Clone>(
    sources: &[(Quadrant, &WellMatrix<T>)],
    source_type: &PlateType,
    target_type: &PlateType,
) -> Result<WellMatrix<Option<T>>> {
    if sources.is_empty() {
        return Err(PlateError::validation(
            "Provide at least one plate to condense",
        ));
    }
    check_condensable(source_type, target_type)?;

    let mut seen = FxHashSet::default();
    for (quadrant, matrix) in sources {
        if !seen.insert(*quadrant) {
            return Err(PlateError::validation(format!(
                "Quadrant {} was provided more than once",
                quadrant.index()
            )));
        }
        source_type.check_shape(matrix, &format!("plate of quadrant {}", quadrant.index()))?;
    }

    let mut condensed: WellMatrix<Option<T>> = Array2::from_elem(target_type.shape(), None);
    for (quadrant, matrix) in sources {
        for ((row, col), value) in matrix.indexed_iter() {
            let dest = quadrant.destination(Well::new(row, col));
            condensed[dest.index()] = Some(value.clone());
        }
    }

    debug!(
        "condensed {} quadrants into a {}x{} plate",
        sources.len(),
        target_type.rows,
        target_type.cols
    );
    Ok(condensed)
}

///
/// Same as [condense] with the default 96 -> 384 plate types.
///
pub fn condense_96_to_384<T: Clone>(
    sources: &[(Quadrant, &WellMatrix<T>)],
) -> Result<WellMatrix<Option<T>>> {
    condense(sources, &PlateType::well_96(), &PlateType::well_384())
}
