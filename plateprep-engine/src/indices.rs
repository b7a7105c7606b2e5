//! Dual-index assignment for shotgun libraries.

use fxhash::FxHashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::WellMatrix;
use plateprep_core::models::{IndexPair, IndexPrimer};

use crate::consts::{MIN_INDEX_VOLUME, UL_TO_NL};

/// How the i5 and i7 primers of a technology are combined into pairs.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexScheme {
    /// pair `k` is `(i5[k], i7[k])`
    Unique,
    /// pair `k` is `(i5[k / n_i7], i7[k % n_i7])`
    Combinatorial,
}

///
/// A named catalogue of index primers.
///
#[derive(Debug, Clone, PartialEq)]
pub struct IndexTechnology {
    pub name: String,
    pub scheme: IndexScheme,
    i5: Vec<IndexPrimer>,
    i7: Vec<IndexPrimer>,
}

fn check_primers(name: &str, kind: &str, primers: &[IndexPrimer]) -> Result<()> {
    if primers.is_empty() {
        return Err(PlateError::validation(format!(
            "Index technology {} doesn't have any {} primer",
            name, kind
        )));
    }
    let mut ids = FxHashSet::default();
    for primer in primers {
        if !ids.insert(primer.id.as_str()) {
            return Err(PlateError::validation(format!(
                "Index technology {} lists the {} primer {} more than once",
                name, kind, primer.id
            )));
        }
    }
    Ok(())
}

impl IndexTechnology {
    pub fn new(
        name: impl Into<String>,
        scheme: IndexScheme,
        i5: Vec<IndexPrimer>,
        i7: Vec<IndexPrimer>,
    ) -> Result<Self> {
        let name = name.into();
        check_primers(&name, "i5", &i5)?;
        check_primers(&name, "i7", &i7)?;
        if scheme == IndexScheme::Unique && i5.len() != i7.len() {
            return Err(PlateError::validation(format!(
                "Index technology {} pairs primers one to one but has {} i5 and {} i7 primers",
                name,
                i5.len(),
                i7.len()
            )));
        }
        Ok(IndexTechnology {
            name,
            scheme,
            i5,
            i7,
        })
    }

    pub fn i5(&self) -> &[IndexPrimer] {
        &self.i5
    }

    pub fn i7(&self) -> &[IndexPrimer] {
        &self.i7
    }

    /// Number of distinct pairs the technology provides.
    pub fn capacity(&self) -> usize {
        match self.scheme {
            IndexScheme::Unique => self.i5.len(),
            IndexScheme::Combinatorial => self.i5.len() * self.i7.len(),
        }
    }

    pub fn pair(&self, number: usize) -> Result<IndexPair> {
        if number >= self.capacity() {
            return Err(PlateError::validation(format!(
                "Index technology {} only has {} index pairs, pair {} was requested",
                self.name,
                self.capacity(),
                number
            )));
        }
        let (i5, i7) = match self.scheme {
            IndexScheme::Unique => (number, number),
            IndexScheme::Combinatorial => (number / self.i7.len(), number % self.i7.len()),
        };
        Ok(IndexPair {
            number,
            i5: self.i5[i5].clone(),
            i7: self.i7[i7].clone(),
        })
    }
}

///
/// Hands out the pairs of one technology in order, never twice. Scoped to a
/// single library prep.
///
#[derive(Debug)]
pub struct IndexAllocator<'a> {
    technology: &'a IndexTechnology,
    next: usize,
}

impl<'a> IndexAllocator<'a> {
    ///
    /// # Arguments
    /// - technology: the catalogue to allocate from
    /// - start: the first pair to hand out, usually the first unused one
    ///
    pub fn new(technology: &'a IndexTechnology, start: usize) -> Self {
        IndexAllocator {
            technology,
            next: start,
        }
    }

    pub fn technology(&self) -> &IndexTechnology {
        self.technology
    }

    pub fn remaining(&self) -> usize {
        self.technology.capacity().saturating_sub(self.next)
    }

    pub fn next_pair(&mut self) -> Result<IndexPair> {
        if self.remaining() == 0 {
            return Err(PlateError::validation(format!(
                "Index technology {} has no index pairs left",
                self.technology.name
            )));
        }
        let pair = self.technology.pair(self.next)?;
        self.next += 1;
        Ok(pair)
    }
}

///
/// Give an index pair to every well holding sample, in row-major order.
///
/// Nothing is allocated when the technology can't cover every well.
///
/// # Arguments
/// - sample_volume: nL of sample per well; wells with less than
///   [MIN_INDEX_VOLUME] uL get no index
/// - allocator: where the pairs come from
///
pub fn assign_indices(
    sample_volume: &WellMatrix<f64>,
    allocator: &mut IndexAllocator,
) -> Result<WellMatrix<Option<IndexPair>>> {
    let needs_index = |vol: &f64| vol / UL_TO_NL > MIN_INDEX_VOLUME;
    let needed = sample_volume.iter().filter(|v| needs_index(*v)).count();
    if needed > allocator.remaining() {
        return Err(PlateError::validation(format!(
            "Index technology {} has {} index pairs left but {} wells need one",
            allocator.technology().name,
            allocator.remaining(),
            needed
        )));
    }

    let mut indices: WellMatrix<Option<IndexPair>> = Array2::from_elem(sample_volume.dim(), None);
    for ((row, col), vol) in sample_volume.indexed_iter() {
        if needs_index(vol) {
            indices[[row, col]] = Some(allocator.next_pair()?);
        }
    }
    debug!(
        "assigned {} index pairs of {}",
        needed,
        allocator.technology().name
    );
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    use plateprep_core::geometry::Well;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn primers(prefix: &str, n: usize, col: usize) -> Vec<IndexPrimer> {
        (0..n)
            .map(|i| IndexPrimer {
                id: format!("{}{}", prefix, i),
                sequence: format!("ACGT{:04}", i),
                source_well: Well::new(i % 16, col + i / 16),
            })
            .collect()
    }

    #[fixture]
    fn unique() -> IndexTechnology {
        IndexTechnology::new("unique", IndexScheme::Unique, primers("i5_", 4, 0), primers("i7_", 4, 12))
            .unwrap()
    }

    #[rstest]
    fn test_combinatorial_pairs() {
        let tech = IndexTechnology::new(
            "combo",
            IndexScheme::Combinatorial,
            primers("i5_", 2, 0),
            primers("i7_", 3, 12),
        )
        .unwrap();
        assert_eq!(tech.capacity(), 6);
        let pair = tech.pair(4).unwrap();
        assert_eq!(pair.i5.id, "i5_1");
        assert_eq!(pair.i7.id, "i7_1");
        assert!(tech.pair(6).is_err());
    }

    #[rstest]
    fn test_unique_needs_same_counts() {
        let tech = IndexTechnology::new("bad", IndexScheme::Unique, primers("i5_", 2, 0), primers("i7_", 3, 12));
        assert!(matches!(tech, Err(PlateError::Validation(_))));
    }

    #[rstest]
    fn test_duplicate_primer() {
        let mut i5 = primers("i5_", 2, 0);
        i5[1].id = "i5_0".to_string();
        let tech = IndexTechnology::new("dup", IndexScheme::Combinatorial, i5, primers("i7_", 3, 12));
        assert!(tech.is_err());
    }

    #[rstest]
    fn test_allocator_never_repeats(unique: IndexTechnology) {
        let mut allocator = IndexAllocator::new(&unique, 1);
        let numbers: Vec<usize> = (0..3).map(|_| allocator.next_pair().unwrap().number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(allocator.remaining(), 0);
        assert!(allocator.next_pair().is_err());
    }

    #[rstest]
    fn test_assign_indices(unique: IndexTechnology) {
        let mut vols = Array2::from_elem((2, 2), 1000.0);
        vols[[0, 1]] = 0.0;
        vols[[1, 0]] = 0.05;
        let mut allocator = IndexAllocator::new(&unique, 0);
        let obs = assign_indices(&vols, &mut allocator).unwrap();

        assert_eq!(obs[[0, 0]].as_ref().map(|p| p.number), Some(0));
        assert_eq!(obs[[0, 1]], None);
        // 0.05 nL is below the threshold
        assert_eq!(obs[[1, 0]], None);
        assert_eq!(obs[[1, 1]].as_ref().map(|p| p.number), Some(1));
        assert_eq!(allocator.remaining(), 2);
    }

    #[rstest]
    fn test_assign_indices_exhausted(unique: IndexTechnology) {
        let vols = Array2::from_elem((2, 3), 1000.0);
        let mut allocator = IndexAllocator::new(&unique, 0);
        let err = assign_indices(&vols, &mut allocator).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Index technology unique has 4 index pairs left but 6 wells need one"
        );
        assert_eq!(allocator.remaining(), 4);
    }
}
