//! Protocol configuration, read from TOML.
//!
//! ```toml
//! [qpcr]
//! slope = -3.231
//!
//! [pooling]
//! min_conc = 10.0
//! equal_volume_total = 60.0
//!
//! [[index_technology]]
//! name = "iTru"
//! scheme = "combinatorial"
//! i5 = [{ id = "iTru5_01_A", sequence = "ACCGACAA", well = "A1" }]
//! i7 = [{ id = "iTru7_101_01", sequence = "ACGTTACC", well = "A13" }]
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use plateprep_core::errors::PlateError;
use plateprep_core::geometry::parse_well_label;
use plateprep_core::models::IndexPrimer;

use crate::consts::{DEFAULT_EQUAL_VOLUME_TOTAL, DEFAULT_INDEX_VOLUME};
use crate::indices::{IndexScheme, IndexTechnology};
use crate::normalize::NormalizationParams;
use crate::pooling::{PoolingParams, StandardCurve};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("Invalid protocol configuration: {0}")]
    Invalid(#[from] PlateError),
    #[error("Unknown index technology: {0}")]
    UnknownTechnology(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

fn default_equal_volume_total() -> f64 {
    DEFAULT_EQUAL_VOLUME_TOTAL
}

fn default_index_volume() -> f64 {
    DEFAULT_INDEX_VOLUME
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PoolingConfig {
    #[serde(flatten)]
    pub params: PoolingParams,
    /// uL pooled when every well contributes the same volume
    #[serde(default = "default_equal_volume_total")]
    pub equal_volume_total: f64,
}

impl Default for PoolingConfig {
    fn default() -> Self {
        PoolingConfig {
            params: PoolingParams::default(),
            equal_volume_total: DEFAULT_EQUAL_VOLUME_TOTAL,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EchoConfig {
    /// nL of each index primer added to a library
    #[serde(default = "default_index_volume")]
    pub index_volume: f64,
}

impl Default for EchoConfig {
    fn default() -> Self {
        EchoConfig {
            index_volume: DEFAULT_INDEX_VOLUME,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PrimerConfig {
    pub id: String,
    pub sequence: String,
    pub well: String, // e.g. A1, on the index source plate
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IndexTechnologyConfig {
    pub name: String,
    pub scheme: IndexScheme,
    pub i5: Vec<PrimerConfig>,
    pub i7: Vec<PrimerConfig>,
}

impl TryFrom<&IndexTechnologyConfig> for IndexTechnology {
    type Error = ConfigError;

    fn try_from(config: &IndexTechnologyConfig) -> ConfigResult<Self> {
        let primers = |primers: &[PrimerConfig]| -> ConfigResult<Vec<IndexPrimer>> {
            primers
                .iter()
                .map(|p| {
                    Ok(IndexPrimer {
                        id: p.id.clone(),
                        sequence: p.sequence.clone(),
                        source_well: parse_well_label(&p.well)?,
                    })
                })
                .collect()
        };
        Ok(IndexTechnology::new(
            config.name.clone(),
            config.scheme,
            primers(&config.i5)?,
            primers(&config.i7)?,
        )?)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProtocolConfig {
    pub qpcr: StandardCurve,
    pub pooling: PoolingConfig,
    pub normalization: NormalizationParams,
    pub echo: EchoConfig,
    pub index_technology: Vec<IndexTechnologyConfig>,
}

impl ProtocolConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.qpcr.validate()?;
        self.pooling.params.validate()?;
        self.normalization.validate()?;
        for technology in &self.index_technology {
            IndexTechnology::try_from(technology)?;
        }
        Ok(())
    }

    ///
    /// Build the index technology called `name`.
    ///
    pub fn index_technology(&self, name: &str) -> ConfigResult<IndexTechnology> {
        let config = self
            .index_technology
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ConfigError::UnknownTechnology(name.to_string()))?;
        IndexTechnology::try_from(config)
    }
}

impl FromStr for ProtocolConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        let config: ProtocolConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<&Path> for ProtocolConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> ConfigResult<Self> {
        let toml_str = read_to_string(path)?;
        toml_str.parse()
    }
}
