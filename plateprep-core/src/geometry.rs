//! Well addressing for rectangular plates.
//!
//! Matrices are always addressed `[row, col]`, row-major, with the origin at
//! the top-left well (`A1`).

use std::fmt::Debug;
use std::str::FromStr;

use ndarray::Array2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::errors::{PlateError, Result};

/// A 2-D matrix holding one value per well.
pub type WellMatrix<T> = Array2<T>;

///
/// Zero-based `(row, col)` position of a well on a plate.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Well {
    pub row: usize,
    pub col: usize,
}

impl Well {
    pub fn new(row: usize, col: usize) -> Self {
        Well { row, col }
    }

    ///
    /// Canonical text form of the well, e.g. `A1`.
    ///
    pub fn label(&self) -> Result<String> {
        well_label(self.row, self.col)
    }

    pub fn index(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

impl FromStr for Well {
    type Err = PlateError;

    fn from_str(s: &str) -> Result<Self> {
        parse_well_label(s)
    }
}

///
/// Render a well position as `<row letter><1-based column>`.
///
/// # Arguments
/// - row: zero-based row index, must be below 26
/// - col: zero-based column index
///
pub fn well_label(row: usize, col: usize) -> Result<String> {
    if row >= MAX_ROWS {
        return Err(PlateError::Range(format!(
            "Row index {} can't be addressed with a single letter (at most {} rows)",
            row, MAX_ROWS
        )));
    }
    let letter = (b'A' + row as u8) as char;
    Ok(format!("{}{}", letter, col + 1))
}

///
/// Parse a well label such as `B13` back into a [Well]. Case-insensitive.
///
pub fn parse_well_label(label: &str) -> Result<Well> {
    let label = label.trim();
    let mut chars = label.chars();

    let letter = chars
        .next()
        .filter(|c| c.is_ascii_alphabetic())
        .ok_or_else(|| PlateError::parse(format!("Invalid well label: {:?}", label)))?;

    let col: usize = chars
        .as_str()
        .parse()
        .map_err(|_| PlateError::parse(format!("Invalid well label: {:?}", label)))?;

    if col == 0 {
        return Err(PlateError::parse(format!(
            "Invalid well label: {:?}, columns start at 1",
            label
        )));
    }

    Ok(Well {
        row: (letter.to_ascii_uppercase() as u8 - b'A') as usize,
        col: col - 1,
    })
}

///
/// The format of a physical plate. The number of rows and columns is fixed
/// for every plate of that type.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlateType {
    pub id: u32,
    pub name: String,
    pub rows: usize,
    pub cols: usize,
}

impl PlateType {
    pub fn new(id: u32, name: impl Into<String>, rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PlateError::validation(format!(
                "A plate type needs at least one row and one column, got ({}, {})",
                rows, cols
            )));
        }
        if rows > MAX_ROWS {
            return Err(PlateError::Range(format!(
                "A plate type can have at most {} rows, got {}",
                MAX_ROWS, rows
            )));
        }
        Ok(PlateType {
            id,
            name: name.into(),
            rows,
            cols,
        })
    }

    pub fn well_96() -> Self {
        PlateType {
            id: PLATE_96_ID,
            name: PLATE_96_NAME.to_string(),
            rows: PLATE_96_ROWS,
            cols: PLATE_96_COLS,
        }
    }

    pub fn well_384() -> Self {
        PlateType {
            id: PLATE_384_ID,
            name: PLATE_384_NAME.to_string(),
            rows: PLATE_384_ROWS,
            cols: PLATE_384_COLS,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn n_wells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, well: Well) -> bool {
        well.row < self.rows && well.col < self.cols
    }

    /// Every well of the plate in row-major order.
    pub fn wells(&self) -> impl Iterator<Item = Well> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Well { row, col }))
    }

    ///
    /// Check that a matrix has exactly the dimensions of this plate type.
    ///
    pub fn check_shape<T>(&self, matrix: &WellMatrix<T>, what: &str) -> Result<()> {
        if matrix.dim() != self.shape() {
            return Err(PlateError::validation(format!(
                "The {} doesn't match the plate type dimensions. Plate type: ({}, {}). {}: ({}, {})",
                what,
                self.rows,
                self.cols,
                what,
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        Ok(())
    }
}

///
/// Check that two matrices have the same dimensions.
///
pub fn check_same_shape<A, B>(
    left: &WellMatrix<A>,
    right: &WellMatrix<B>,
    left_name: &str,
    right_name: &str,
) -> Result<()> {
    if left.dim() != right.dim() {
        return Err(PlateError::validation(format!(
            "{} {:?} and {} {:?} must have the same shape",
            left_name,
            left.dim(),
            right_name,
            right.dim()
        )));
    }
    Ok(())
}

///
/// Build a [WellMatrix] from nested rows, rejecting ragged input.
///
pub fn matrix_from_rows<T: Clone + Debug>(rows: Vec<Vec<T>>) -> Result<WellMatrix<T>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);

    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(PlateError::validation(format!(
            "The given layout doesn't form a valid plate map because not all rows have \
             the same number of columns: row {} has {}, expected {}",
            idx + 1,
            row.len(),
            n_cols
        )));
    }

    let flat: Vec<T> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| PlateError::validation(format!("Invalid plate matrix: {}", e)))
}

///
/// Position of a 96-well source plate inside a 384-well condensed plate.
///
/// Quadrants interleave: quadrant `q` owns the destination wells whose row
/// parity is `q / 2` and whose column parity is `q % 2`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quadrant(u8);

impl Quadrant {
    pub fn new(index: usize) -> Result<Self> {
        if index >= QUADRANTS {
            return Err(PlateError::validation(format!(
                "Quadrant index must be between 0 and {}, got {}",
                QUADRANTS - 1,
                index
            )));
        }
        Ok(Quadrant(index as u8))
    }

    pub fn all() -> [Quadrant; QUADRANTS] {
        [Quadrant(0), Quadrant(1), Quadrant(2), Quadrant(3)]
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn row_offset(&self) -> usize {
        self.index() / 2
    }

    pub fn col_offset(&self) -> usize {
        self.index() % 2
    }

    /// Where a source well of this quadrant lands on the condensed plate.
    pub fn destination(&self, source: Well) -> Well {
        Well {
            row: 2 * source.row + self.row_offset(),
            col: 2 * source.col + self.col_offset(),
        }
    }
}
