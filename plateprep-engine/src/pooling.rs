//! qPCR driven pooling of shotgun libraries.
//!
//! Cp values are turned into molar concentrations with a standard curve, and
//! every well then contributes a volume proportional to its share of the pool.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::{WellMatrix, check_same_shape};

use crate::consts::*;
use crate::normalize::TransferVolumes;

/// qPCR standard curve: `Cp = m * log10(conc) + b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardCurve {
    pub slope: f64,
    pub intercept: f64,
    pub dilution_factor: f64,
}

impl Default for StandardCurve {
    fn default() -> Self {
        StandardCurve {
            slope: DEFAULT_CURVE_SLOPE,
            intercept: DEFAULT_CURVE_INTERCEPT,
            dilution_factor: DEFAULT_DILUTION_FACTOR,
        }
    }
}

impl StandardCurve {
    pub fn validate(&self) -> Result<()> {
        if self.slope == 0.0 || !self.slope.is_finite() {
            return Err(PlateError::validation(format!(
                "The standard curve slope must be a non-zero number, got {}",
                self.slope
            )));
        }
        if !self.intercept.is_finite() || !self.dilution_factor.is_finite() {
            return Err(PlateError::validation(
                "The standard curve intercept and dilution factor must be finite",
            ));
        }
        Ok(())
    }

    /// nM concentration of one Cp value.
    pub fn concentration(&self, cp: f64) -> f64 {
        10f64.powf((cp - self.intercept) / self.slope) * self.dilution_factor / 1000.0
    }
}

///
/// Compute library concentrations (nM) from qPCR Cp values.
///
pub fn compute_qpcr_concentration(
    cp: &WellMatrix<f64>,
    curve: &StandardCurve,
) -> Result<WellMatrix<f64>> {
    curve.validate()?;
    Ok(cp.mapv(|v| curve.concentration(v)))
}

///
/// Same as [compute_qpcr_concentration] for exports holding "no call" wells.
/// A well without a Cp has a concentration of 0 and is left out of any pool.
///
pub fn compute_qpcr_concentration_calls(
    cp: &WellMatrix<Option<f64>>,
    curve: &StandardCurve,
) -> Result<WellMatrix<f64>> {
    curve.validate()?;
    let no_calls = cp.iter().filter(|v| v.is_none()).count();
    if no_calls > 0 {
        warn!("{} wells have no Cp value and won't be pooled", no_calls);
    }
    Ok(cp.mapv(|v| v.map_or(0.0, |v| curve.concentration(v))))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolingParams {
    /// nM; wells at or below this are left out of the pool
    pub min_conc: f64,
    /// nM; wells below this are pooled as if they had this concentration
    pub floor_conc: f64,
    /// nmol of library in the pool
    pub total_nmol: f64,
}

impl Default for PoolingParams {
    fn default() -> Self {
        PoolingParams {
            min_conc: DEFAULT_MIN_CONC,
            floor_conc: DEFAULT_FLOOR_CONC,
            total_nmol: DEFAULT_TOTAL_NMOL,
        }
    }
}

impl PoolingParams {
    pub fn validate(&self) -> Result<()> {
        if !self.floor_conc.is_finite() || self.floor_conc <= 0.0 {
            return Err(PlateError::validation(format!(
                "floor_conc must be a positive number, got {}",
                self.floor_conc
            )));
        }
        if !self.total_nmol.is_finite() || self.total_nmol <= 0.0 {
            return Err(PlateError::validation(format!(
                "total_nmol must be a positive number, got {}",
                self.total_nmol
            )));
        }
        if !self.min_conc.is_finite() {
            return Err(PlateError::validation("min_conc must be finite"));
        }
        Ok(())
    }
}

///
/// Compute how many nL of each well go into the pool.
///
/// Wells at or below `min_conc` get nothing and the fractions of the others
/// are renormalized. Concentrations under `floor_conc` are raised to it, which
/// caps the volume taken from weak libraries.
///
/// # Arguments
/// - sample_concs: nM per well, from [compute_qpcr_concentration]
/// - sample_fracs: share of the pool per well, `1/N` for every well if `None`
/// - params: exclusion and floor thresholds, and the amount to pool
///
pub fn compute_shotgun_pooling_values_qpcr(
    sample_concs: &WellMatrix<f64>,
    sample_fracs: Option<&WellMatrix<f64>>,
    params: &PoolingParams,
) -> Result<WellMatrix<f64>> {
    params.validate()?;
    if sample_concs.is_empty() {
        return Err(PlateError::validation("There are no wells to pool"));
    }

    let mut fracs = match sample_fracs {
        Some(fracs) => {
            check_same_shape(sample_concs, fracs, "sample concentrations", "sample fractions")?;
            fracs.clone()
        }
        None => Array2::from_elem(sample_concs.dim(), 1.0 / sample_concs.len() as f64),
    };

    let mut excluded = 0usize;
    ndarray::Zip::from(&mut fracs)
        .and(sample_concs)
        .for_each(|frac, conc| {
            if *conc <= params.min_conc {
                *frac = 0.0;
                excluded += 1;
            }
        });
    if excluded > 0 {
        warn!(
            "{} wells are at or below {} nM and are left out of the pool",
            excluded, params.min_conc
        );
    }

    let total: f64 = fracs.sum();
    if total == 0.0 {
        return Err(PlateError::DivisionByZero(format!(
            "no well is above the minimum concentration of {} nM",
            params.min_conc
        )));
    }
    fracs.mapv_inplace(|f| f / total);

    let mut vols: WellMatrix<f64> = Array2::zeros(sample_concs.dim());
    ndarray::Zip::from(&mut vols)
        .and(&fracs)
        .and(sample_concs)
        .for_each(|vol, frac, conc| {
            let floored = conc.max(params.floor_conc);
            *vol = params.total_nmol * frac / floored / NL_TO_L;
        });

    debug!(
        "pooling {} of {} wells",
        sample_concs.len() - excluded,
        sample_concs.len()
    );
    Ok(vols)
}

///
/// Pool the same volume of every well, `total_vol` uL in total. The water
/// matrix is all zeros.
///
pub fn compute_shotgun_pooling_values_eqvol(
    sample_concs: &WellMatrix<f64>,
    total_vol: f64,
) -> Result<TransferVolumes> {
    if sample_concs.is_empty() {
        return Err(PlateError::DivisionByZero(
            "there are no wells to share the pool volume".to_string(),
        ));
    }
    if !total_vol.is_finite() || total_vol <= 0.0 {
        return Err(PlateError::validation(format!(
            "The pool volume must be a positive number, got {}",
            total_vol
        )));
    }
    let per_sample = total_vol / sample_concs.len() as f64 * UL_TO_NL;
    Ok(TransferVolumes {
        sample: Array2::from_elem(sample_concs.dim(), per_sample),
        water: Array2::zeros(sample_concs.dim()),
    })
}

/// Molarity (nM) and volume (nL) of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolEstimate {
    pub concentration: f64,
    pub volume: f64,
}

///
/// Estimate the concentration and total volume of the pool built from
/// `sample_vols` nL of libraries at `sample_concs` nM.
///
pub fn estimate_pool_conc_vol(
    sample_vols: &WellMatrix<f64>,
    sample_concs: &WellMatrix<f64>,
) -> Result<PoolEstimate> {
    check_same_shape(sample_vols, sample_concs, "sample volumes", "sample concentrations")?;

    let total_vol = sample_vols.sum();
    if total_vol == 0.0 {
        return Err(PlateError::DivisionByZero(
            "the pool doesn't have any volume".to_string(),
        ));
    }
    let total_pmol: f64 = (sample_concs * sample_vols).sum() * NL_TO_L;
    Ok(PoolEstimate {
        concentration: total_pmol / (total_vol * NL_TO_L),
        volume: total_vol,
    })
}
