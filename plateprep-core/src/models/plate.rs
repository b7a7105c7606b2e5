//! Plate records, one variant per pipeline stage.
//!
//! A derived plate owns its own well matrices and refers to its ancestors only
//! by identifier. Ancestors are re-read through a
//! [PlateStore](crate::store::PlateStore) when needed.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{PlateError, Result};
use crate::geometry::{PlateType, Quadrant, WellMatrix};
use crate::models::index::IndexPair;

pub type PlateId = u32;

/// Per-well record of a sample plate layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SampleWell {
    pub sample_id: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
}

impl SampleWell {
    pub fn with_sample(sample_id: impl Into<String>) -> Self {
        SampleWell {
            sample_id: Some(sample_id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplePlate {
    pub studies: Vec<u32>,
    pub layout: Option<WellMatrix<Option<SampleWell>>>,
}

/// Extraction of a sample plate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DnaPlate {
    pub sample_plate_id: PlateId,
    pub extraction_robot: String,
    pub extraction_kit_lot: String,
    pub extraction_tool: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuadrantSource {
    pub plate_id: PlateId,
    pub quadrant: Quadrant,
}

/// DNA quantification attached to a condensed plate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quantification {
    pub plate_reader: String,
    /// Volume (uL) available from every well.
    pub input_volume: f64,
    /// ng/uL. `None` marks a well that was not measured.
    pub dna_concentration: WellMatrix<Option<f64>>,
    pub quantified_by: String,
    pub quantified_on: DateTime<Utc>,
}

/// Condensed plate built from up to four DNA plates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShotgunPlate {
    pub sources: Vec<QuadrantSource>,
    pub robot: String,
    pub volume: f64,
    pub quantification: Option<Quantification>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShotgunLibrary {
    pub mosquito: String,
    pub kit: String,
    pub aliquot: String,
    pub index_technology: String,
    pub indices: WellMatrix<Option<IndexPair>>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalizedShotgunPlate {
    pub shotgun_plate_id: PlateId,
    pub echo: String,
    pub input_dna: f64,
    /// nL of sample to transfer per well.
    pub sample_volume: WellMatrix<f64>,
    /// nL of water to transfer per well.
    pub water_volume: WellMatrix<f64>,
    pub library: Option<ShotgunLibrary>,
}

/// Target gene library plate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetedPlate {
    pub dna_plate_id: PlateId,
    pub primer_plate_id: PlateId,
    pub robot: String,
    pub tm300_8_tool: String,
    pub tm50_8_tool: String,
    pub master_mix_lot: String,
    pub water_lot: String,
    pub raw_concentration: Option<WellMatrix<f64>>,
    pub mod_concentration: Option<WellMatrix<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlateStage {
    Sample(SamplePlate),
    Dna(DnaPlate),
    Shotgun(ShotgunPlate),
    NormalizedShotgun(NormalizedShotgunPlate),
    Targeted(TargetedPlate),
}

impl PlateStage {
    pub fn name(&self) -> &'static str {
        match self {
            PlateStage::Sample(_) => "Sample plate",
            PlateStage::Dna(_) => "DNA plate",
            PlateStage::Shotgun(_) => "Shotgun plate",
            PlateStage::NormalizedShotgun(_) => "Normalized shotgun plate",
            PlateStage::Targeted(_) => "Target Gene plate",
        }
    }
}

///
/// A persisted plate: common bookkeeping plus its stage-specific record.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plate {
    pub id: PlateId,
    pub name: String,
    pub plate_type: PlateType,
    pub created_by: String,
    pub created_on: DateTime<Utc>,
    pub notes: Option<String>,
    pub stage: PlateStage,
}

impl Plate {
    pub fn new(
        id: PlateId,
        name: impl Into<String>,
        plate_type: PlateType,
        created_by: impl Into<String>,
        stage: PlateStage,
    ) -> Self {
        Plate {
            id,
            name: name.into(),
            plate_type,
            created_by: created_by.into(),
            created_on: Utc::now(),
            notes: None,
            stage,
        }
    }

    ///
    /// Identifiers of the plates this one was derived from, in lineage order.
    ///
    pub fn parents(&self) -> Vec<PlateId> {
        match &self.stage {
            PlateStage::Sample(_) => vec![],
            PlateStage::Dna(dna) => vec![dna.sample_plate_id],
            PlateStage::Shotgun(sg) => sg.sources.iter().map(|s| s.plate_id).collect(),
            PlateStage::NormalizedShotgun(norm) => vec![norm.shotgun_plate_id],
            PlateStage::Targeted(t) => vec![t.dna_plate_id],
        }
    }

    fn wrong_stage(&self, expected: &str) -> PlateError {
        PlateError::validation(format!(
            "Plate {} is a {}, expected a {}",
            self.id,
            self.stage.name(),
            expected
        ))
    }

    pub fn as_sample(&self) -> Result<&SamplePlate> {
        match &self.stage {
            PlateStage::Sample(p) => Ok(p),
            _ => Err(self.wrong_stage("Sample plate")),
        }
    }

    pub fn as_dna(&self) -> Result<&DnaPlate> {
        match &self.stage {
            PlateStage::Dna(p) => Ok(p),
            _ => Err(self.wrong_stage("DNA plate")),
        }
    }

    pub fn as_shotgun(&self) -> Result<&ShotgunPlate> {
        match &self.stage {
            PlateStage::Shotgun(p) => Ok(p),
            _ => Err(self.wrong_stage("Shotgun plate")),
        }
    }

    pub fn as_normalized_shotgun(&self) -> Result<&NormalizedShotgunPlate> {
        match &self.stage {
            PlateStage::NormalizedShotgun(p) => Ok(p),
            _ => Err(self.wrong_stage("Normalized shotgun plate")),
        }
    }

    pub fn as_targeted(&self) -> Result<&TargetedPlate> {
        match &self.stage {
            PlateStage::Targeted(p) => Ok(p),
            _ => Err(self.wrong_stage("Target Gene plate")),
        }
    }
}

impl Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {})",
            self.stage.name(),
            self.id,
            self.name,
            self.plate_type.name
        )
    }
}
