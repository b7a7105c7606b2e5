#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{PlateError, Result};
use crate::models::plate::PlateId;

pub type PoolId = u32;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolContribution {
    pub source_plate_id: PlateId,
    pub volume: f64,
    pub percentage: f64,
}

///
/// A mixture of library plates prepared for sequencing. Immutable once
/// created.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub volume: f64,
    pub contributions: Vec<PoolContribution>,
    pub notes: Option<String>,
}

impl Pool {
    pub fn new(
        id: PoolId,
        name: impl Into<String>,
        volume: f64,
        contributions: Vec<PoolContribution>,
    ) -> Result<Self> {
        if contributions.is_empty() {
            return Err(PlateError::validation("Provide at least one plate to pool."));
        }
        if !(volume.is_finite() && volume > 0.0) {
            return Err(PlateError::validation(format!(
                "Pool volume must be > 0, got {}",
                volume
            )));
        }
        if let Some(c) = contributions
            .iter()
            .find(|c| !(c.volume.is_finite() && c.volume >= 0.0))
        {
            return Err(PlateError::validation(format!(
                "Contribution of plate {} has an invalid volume: {}",
                c.source_plate_id, c.volume
            )));
        }
        Ok(Pool {
            id,
            name: name.into(),
            volume,
            contributions,
            notes: None,
        })
    }

    pub fn source_plate_ids(&self) -> Vec<PlateId> {
        self.contributions.iter().map(|c| c.source_plate_id).collect()
    }
}
