use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{PlateError, Result};
use crate::models::index::IndexPair;
use crate::models::pool::PoolId;

pub type RunId = u32;

/// Sequencer family. HiSeq runs are lane-addressed, MiSeq runs are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InstrumentType {
    MiSeq,
    HiSeq,
}

impl InstrumentType {
    pub fn is_lane_addressed(&self) -> bool {
        matches!(self, InstrumentType::HiSeq)
    }
}

impl FromStr for InstrumentType {
    type Err = PlateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "miseq" => Ok(InstrumentType::MiSeq),
            "hiseq" => Ok(InstrumentType::HiSeq),
            _ => Err(PlateError::validation(format!(
                "{} is not a recognized instrument type",
                s
            ))),
        }
    }
}

impl Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentType::MiSeq => write!(f, "miseq"),
            InstrumentType::HiSeq => write!(f, "hiseq"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunType {
    TargetGene,
    Shotgun,
}

impl FromStr for RunType {
    type Err = PlateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Target Gene" => Ok(RunType::TargetGene),
            "Shotgun" => Ok(RunType::Shotgun),
            _ => Err(PlateError::validation(format!(
                "{} is not a known run type",
                s
            ))),
        }
    }
}

impl Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunType::TargetGene => write!(f, "Target Gene"),
            RunType::Shotgun => write!(f, "Shotgun"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunState {
    Pending,
    Running,
    Complete,
    Failed,
}

impl RunState {
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Pending, RunState::Running)
                | (RunState::Pending, RunState::Failed)
                | (RunState::Running, RunState::Complete)
                | (RunState::Running, RunState::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contact {
    pub name: String,
    pub email: String,
}

impl Contact {
    /// A name without an email (or the other way round) is rejected. A fully
    /// blank contact passes here and is left to whoever requires it.
    pub fn validate(&self) -> Result<()> {
        match (self.name.trim(), self.email.trim()) {
            (name, "") if !name.is_empty() => Err(PlateError::validation(format!(
                "email is missing for {}",
                name
            ))),
            ("", email) if !email.is_empty() => Err(PlateError::validation(format!(
                "name is missing for {}",
                email
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SequencingRun {
    pub id: RunId,
    pub pool_id: PoolId,
    pub name: String,
    pub platform: InstrumentType,
    pub run_type: RunType,
    pub assay: String,
    pub fwd_cycles: u32,
    pub rev_cycles: u32,
    pub reagent_kit_type: String,
    pub reagent_kit_lot: String,
    pub principal_investigator: Contact,
    /// Up to three additional contacts; the first one is required.
    pub contacts: Vec<Contact>,
    pub state: RunState,
    pub created_by: String,
    pub created_on: DateTime<Utc>,
}

impl SequencingRun {
    pub fn validate(&self) -> Result<()> {
        if self.fwd_cycles == 0 {
            return Err(PlateError::validation("fwd_cycles must be > 0"));
        }
        if self.rev_cycles == 0 {
            return Err(PlateError::validation("rev_cycles must be > 0"));
        }
        if self.contacts.is_empty() {
            return Err(PlateError::validation(
                "At least one contact besides the PI is required",
            ));
        }
        if self.contacts.len() > 3 {
            return Err(PlateError::validation(format!(
                "At most 3 contacts are supported, got {}",
                self.contacts.len()
            )));
        }
        self.principal_investigator.validate()?;
        for contact in &self.contacts {
            contact.validate()?;
        }
        Ok(())
    }

    pub fn advance(&mut self, next: RunState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(PlateError::validation(format!(
                "Sequencing run {} can't move from {:?} to {:?}",
                self.id, self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }
}

/// One row of a sample sheet data table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SheetSample {
    pub sample_id: String,
    pub lane: Option<u32>,
    pub i7_index_id: String,
    pub i7_index: String,
    pub i5_index_id: String,
    pub i5_index: String,
}

impl SheetSample {
    pub fn from_index_pair(sample_id: impl Into<String>, pair: &IndexPair, lane: Option<u32>) -> Self {
        SheetSample {
            sample_id: sample_id.into(),
            lane,
            i7_index_id: pair.i7.id.clone(),
            i7_index: pair.i7.sequence.clone(),
            i5_index_id: pair.i5.id.clone(),
            i5_index: pair.i5.sequence.clone(),
        }
    }
}
