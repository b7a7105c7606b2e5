#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Well;

/// One index primer and where it sits on its index source plate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexPrimer {
    pub id: String,
    pub sequence: String,
    pub source_well: Well,
}

///
/// A dual-index (i5/i7) identity given to one well.
///
/// `number` is the position of the pair in its technology's catalogue; two
/// wells never share a number for the same technology.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexPair {
    pub number: usize,
    pub i5: IndexPrimer,
    pub i7: IndexPrimer,
}
