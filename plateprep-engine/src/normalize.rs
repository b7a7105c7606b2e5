//! Shotgun normalization: how much sample and water to move into each well so
//! every library starts from the same amount of DNA.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::{Well, WellMatrix, check_same_shape};

use crate::consts::{DEFAULT_INPUT_DNA, DEFAULT_INPUT_VOLUME, UL_TO_NL};

/// Parallel sample and water volumes (nL), one per well.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferVolumes {
    pub sample: WellMatrix<f64>,
    pub water: WellMatrix<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationParams {
    /// uL of liquid in every normalized well
    pub input_volume: f64,
    /// ng of DNA wanted in every normalized well
    pub input_dna: f64,
}

impl Default for NormalizationParams {
    fn default() -> Self {
        NormalizationParams {
            input_volume: DEFAULT_INPUT_VOLUME,
            input_dna: DEFAULT_INPUT_DNA,
        }
    }
}

impl NormalizationParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("input_volume", self.input_volume),
            ("input_dna", self.input_dna),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlateError::validation(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn usable_concentration(conc: Option<f64>, well: Well) -> Result<f64> {
    match conc {
        Some(c) if c.is_finite() && c > 0.0 => Ok(c),
        other => {
            let value = other.map_or_else(|| "no value".to_string(), |c| c.to_string());
            Err(PlateError::validation(format!(
                "Well {} can't be normalized, its DNA concentration is {}",
                well.label()?,
                value
            )))
        }
    }
}

///
/// Compute the sample and water volumes that bring `input_dna` ng of every
/// well into `input_volume` uL.
///
/// Wells too dilute to reach `input_dna` get the whole `input_volume` of
/// sample and no water. Returned volumes are in nL.
///
/// # Arguments
/// - dna_concentration: ng/uL per well; every well must have a positive value
/// - params: the target volume and DNA amount
///
pub fn compute_shotgun_normalization_values(
    dna_concentration: &WellMatrix<Option<f64>>,
    params: &NormalizationParams,
) -> Result<TransferVolumes> {
    let occupied = Array2::from_elem(dna_concentration.dim(), true);
    compute_shotgun_normalization_values_for_wells(dna_concentration, &occupied, params)
}

///
/// Same as [compute_shotgun_normalization_values], restricted to the wells
/// flagged in `occupied`. Other wells get no sample and no water, whatever
/// their concentration.
///
pub fn compute_shotgun_normalization_values_for_wells(
    dna_concentration: &WellMatrix<Option<f64>>,
    occupied: &WellMatrix<bool>,
    params: &NormalizationParams,
) -> Result<TransferVolumes> {
    params.validate()?;
    check_same_shape(dna_concentration, occupied, "DNA concentration", "occupied wells")?;

    let mut sample = Array2::zeros(dna_concentration.dim());
    let mut water = Array2::zeros(dna_concentration.dim());
    let mut clamped = 0usize;
    let mut normalized = 0usize;

    for ((row, col), conc) in dna_concentration.indexed_iter() {
        if !occupied[[row, col]] {
            continue;
        }
        normalized += 1;
        let conc = usable_concentration(*conc, Well::new(row, col))?;
        let wanted = params.input_dna / conc;
        let vol_sample = if wanted > params.input_volume {
            clamped += 1;
            params.input_volume
        } else {
            wanted
        };
        sample[[row, col]] = vol_sample * UL_TO_NL;
        water[[row, col]] = (params.input_volume - vol_sample) * UL_TO_NL;
    }

    if clamped > 0 {
        warn!(
            "{} wells are too dilute to reach {} ng and get the full {} uL of sample",
            clamped, params.input_dna, params.input_volume
        );
    }
    debug!(
        "normalized {} wells to {} ng in {} uL",
        normalized,
        params.input_dna,
        params.input_volume
    );
    Ok(TransferVolumes { sample, water })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn params(input_volume: f64, input_dna: f64) -> NormalizationParams {
        NormalizationParams {
            input_volume,
            input_dna,
        }
    }

    #[rstest]
    #[case(10.0, 1000.0, 2500.0)]
    #[case(0.25, 3500.0, 0.0)]
    #[case(2.0, 3500.0, 0.0)]
    #[case(100.0, 100.0, 3400.0)]
    fn test_compute_shotgun_normalization_values(
        #[case] conc: f64,
        #[case] sample: f64,
        #[case] water: f64,
    ) {
        let concs = Array2::from_elem((2, 2), Some(conc));
        let obs = compute_shotgun_normalization_values(&concs, &params(3.5, 10.0)).unwrap();
        assert!(obs.sample.iter().all(|v| (v - sample).abs() < 1e-9));
        assert!(obs.water.iter().all(|v| (v - water).abs() < 1e-9));
    }

    #[rstest]
    fn test_volumes_add_up() {
        let concs = Array2::from_shape_fn((8, 12), |(r, c)| Some(0.5 + (r * 12 + c) as f64));
        let obs = compute_shotgun_normalization_values(&concs, &NormalizationParams::default())
            .unwrap();
        for (s, w) in obs.sample.iter().zip(obs.water.iter()) {
            assert!((s + w - 3500.0).abs() < 1e-9);
            assert!(*w >= 0.0);
        }
    }

    #[rstest]
    #[case(None, "no value")]
    #[case(Some(0.0), "0")]
    #[case(Some(-1.5), "-1.5")]
    #[case(Some(f64::NAN), "NaN")]
    fn test_unusable_concentration(#[case] conc: Option<f64>, #[case] shown: &str) {
        let mut concs = Array2::from_elem((2, 3), Some(10.0));
        concs[[1, 2]] = conc;
        let err =
            compute_shotgun_normalization_values(&concs, &NormalizationParams::default())
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Well B3 can't be normalized, its DNA concentration is {}", shown)
        );
    }

    #[rstest]
    fn test_unoccupied_wells_are_skipped() {
        let mut concs = Array2::from_elem((2, 2), Some(10.0));
        concs[[1, 1]] = None;
        concs[[0, 1]] = Some(0.0);
        let mut occupied = Array2::from_elem((2, 2), true);
        occupied[[1, 1]] = false;
        occupied[[0, 1]] = false;

        let obs = compute_shotgun_normalization_values_for_wells(
            &concs,
            &occupied,
            &NormalizationParams::default(),
        )
        .unwrap();
        assert_eq!(obs.sample, ndarray::arr2(&[[1000.0, 0.0], [1000.0, 0.0]]));
        assert_eq!(obs.water, ndarray::arr2(&[[2500.0, 0.0], [2500.0, 0.0]]));
    }

    #[rstest]
    fn test_occupied_well_without_concentration() {
        let mut concs = Array2::from_elem((2, 2), Some(10.0));
        concs[[1, 0]] = None;
        let mut occupied = Array2::from_elem((2, 2), true);
        occupied[[1, 1]] = false;

        let err = compute_shotgun_normalization_values_for_wells(
            &concs,
            &occupied,
            &NormalizationParams::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Well B1 can't be normalized, its DNA concentration is no value"
        );
    }

    #[rstest]
    fn test_occupied_wells_shape_mismatch() {
        let concs = Array2::from_elem((2, 2), Some(10.0));
        let occupied = Array2::from_elem((2, 3), true);
        assert!(matches!(
            compute_shotgun_normalization_values_for_wells(
                &concs,
                &occupied,
                &NormalizationParams::default()
            ),
            Err(PlateError::Validation(_))
        ));
    }

    #[rstest]
    #[case(0.0, 10.0)]
    #[case(3.5, -1.0)]
    #[case(f64::INFINITY, 10.0)]
    fn test_bad_params(#[case] input_volume: f64, #[case] input_dna: f64) {
        let concs = Array2::from_elem((1, 1), Some(10.0));
        assert!(matches!(
            compute_shotgun_normalization_values(&concs, &params(input_volume, input_dna)),
            Err(PlateError::Validation(_))
        ));
    }
}
