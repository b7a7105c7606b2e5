//! Shotgun branch: condense, quantify, normalize, index, pool.

use chrono::Utc;
use ndarray::Array2;
use tracing::{info, warn};

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::{PlateType, Quadrant, WellMatrix};
use plateprep_core::models::*;
use plateprep_core::store::PlateStore;

use super::extraction::{SampleLayout, sample_layout};
use super::{require_positive, require_text};
use crate::condense::{check_condensable, condense};
use crate::consts::UL_TO_NL;
use crate::indices::{IndexAllocator, IndexTechnology, assign_indices};
use crate::normalize::{NormalizationParams, compute_shotgun_normalization_values_for_wells};
use crate::pooling::*;

#[derive(Debug, Clone, PartialEq)]
pub struct CondenseDetails {
    pub name: String,
    pub robot: String,
    /// uL moved out of every DNA well
    pub volume: f64,
}

///
/// Condense up to four 96-well DNA plates into a new 384-well shotgun plate.
///
/// # Arguments
/// - sources: `(dna_plate_id, quadrant)` pairs, quadrants in `0..4`
/// - details: name, robot and volume of the condensed plate
///
pub fn condense_dna_plates<S: PlateStore + ?Sized>(
    store: &mut S,
    sources: &[(PlateId, usize)],
    details: &CondenseDetails,
    created_by: &str,
) -> Result<PlateId> {
    require_text(&details.name, "Plate name")?;
    require_text(&details.robot, "Condensation robot")?;
    require_positive(details.volume, "Condensation volume")?;

    let target_type = PlateType::well_384();
    let mut quadrant_sources = Vec::with_capacity(sources.len());
    let mut placeholders = Vec::with_capacity(sources.len());
    for (plate_id, quadrant) in sources {
        let plate = store.get_plate(*plate_id)?;
        plate.as_dna()?;
        check_condensable(&plate.plate_type, &target_type)?;
        let quadrant = Quadrant::new(*quadrant)?;
        quadrant_sources.push(QuadrantSource {
            plate_id: *plate_id,
            quadrant,
        });
        placeholders.push((quadrant, Array2::from_elem(plate.plate_type.shape(), ())));
    }
    // runs the quadrant checks (none given, duplicates) before anything is written
    let refs: Vec<(Quadrant, &WellMatrix<()>)> =
        placeholders.iter().map(|(q, m)| (*q, m)).collect();
    condense(&refs, &PlateType::well_96(), &target_type)?;

    let id = store.allocate_plate_id();
    let plate = Plate::new(
        id,
        details.name.clone(),
        target_type,
        created_by,
        PlateStage::Shotgun(ShotgunPlate {
            sources: quadrant_sources,
            robot: details.robot.clone(),
            volume: details.volume,
            quantification: None,
        }),
    );
    store.insert_plate(plate)?;
    info!("condensed {} DNA plates into shotgun plate {}", sources.len(), id);
    Ok(id)
}

///
/// Sample layout of a shotgun plate, rebuilt from the layouts of its DNA
/// plates. Wells of missing quadrants or empty source wells are `None`.
///
pub fn condensed_layout<S: PlateStore + ?Sized>(
    store: &S,
    shotgun_plate_id: PlateId,
) -> Result<SampleLayout> {
    let plate = store.get_plate(shotgun_plate_id)?;
    let shotgun = plate.as_shotgun()?;

    let mut layouts = Vec::with_capacity(shotgun.sources.len());
    for source in &shotgun.sources {
        let source_type = store.get_plate(source.plate_id)?.plate_type;
        let layout = sample_layout(store, source.plate_id)?
            .unwrap_or_else(|| Array2::from_elem(source_type.shape(), None));
        layouts.push((source.quadrant, layout));
    }
    let refs: Vec<(Quadrant, &SampleLayout)> = layouts.iter().map(|(q, l)| (*q, l)).collect();
    let condensed = condense(&refs, &PlateType::well_96(), &plate.plate_type)?;
    Ok(condensed.mapv(|well| well.flatten()))
}

/// Wells of a shotgun plate that one of its source quadrants fills.
fn occupied_wells(shotgun: &ShotgunPlate, plate_type: &PlateType) -> Result<WellMatrix<bool>> {
    let source_type = PlateType::well_96();
    let placeholders: Vec<(Quadrant, WellMatrix<()>)> = shotgun
        .sources
        .iter()
        .map(|s| (s.quadrant, Array2::from_elem(source_type.shape(), ())))
        .collect();
    let refs: Vec<(Quadrant, &WellMatrix<()>)> =
        placeholders.iter().map(|(q, m)| (*q, m)).collect();
    Ok(condense(&refs, &source_type, plate_type)?.mapv(|well| well.is_some()))
}

/// DNA concentrations (ng/uL) measured on a plate reader.
#[derive(Debug, Clone, PartialEq)]
pub enum ConcentrationInput {
    /// One reading of the whole condensed plate.
    Plate(WellMatrix<f64>),
    /// One reading per 96-well source plate, condensed the same way the DNA was.
    Quadrants(Vec<(Quadrant, WellMatrix<f64>)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantificationDetails {
    pub plate_reader: String,
    /// uL available in every well
    pub input_volume: f64,
}

///
/// Attach DNA concentrations to a shotgun plate. A plate is quantified once.
///
pub fn quantify_shotgun_plate<S: PlateStore + ?Sized>(
    store: &mut S,
    shotgun_plate_id: PlateId,
    concentrations: ConcentrationInput,
    details: &QuantificationDetails,
    quantified_by: &str,
) -> Result<()> {
    require_text(&details.plate_reader, "Plate reader")?;
    require_positive(details.input_volume, "Input volume")?;

    let mut plate = store.get_plate(shotgun_plate_id)?;
    if plate.as_shotgun()?.quantification.is_some() {
        return Err(PlateError::validation(format!(
            "{} has already been quantified",
            plate
        )));
    }

    let dna_concentration = match concentrations {
        ConcentrationInput::Plate(concs) => {
            plate.plate_type.check_shape(&concs, "concentration matrix")?;
            concs.mapv(Some)
        }
        ConcentrationInput::Quadrants(quadrants) => {
            let refs: Vec<(Quadrant, &WellMatrix<f64>)> =
                quadrants.iter().map(|(q, m)| (*q, m)).collect();
            condense(&refs, &PlateType::well_96(), &plate.plate_type)?
        }
    };

    if let PlateStage::Shotgun(shotgun) = &mut plate.stage {
        shotgun.quantification = Some(Quantification {
            plate_reader: details.plate_reader.clone(),
            input_volume: details.input_volume,
            dna_concentration,
            quantified_by: quantified_by.to_string(),
            quantified_on: Utc::now(),
        });
    }
    store.replace_plate(plate)?;
    info!("quantified shotgun plate {}", shotgun_plate_id);
    Ok(())
}

///
/// Compute the normalization of a quantified shotgun plate and record it as a
/// new normalized shotgun plate.
///
pub fn normalize_shotgun_plate<S: PlateStore + ?Sized>(
    store: &mut S,
    shotgun_plate_id: PlateId,
    echo: &str,
    params: &NormalizationParams,
    created_by: &str,
) -> Result<PlateId> {
    require_text(echo, "Echo")?;

    let plate = store.get_plate(shotgun_plate_id)?;
    let shotgun = plate.as_shotgun()?;
    let quantification = shotgun.quantification.as_ref().ok_or_else(|| {
        PlateError::validation(format!(
            "{} must be quantified before it can be normalized",
            plate
        ))
    })?;
    // wells of quadrants nothing was condensed into stay empty
    let occupied = occupied_wells(shotgun, &plate.plate_type)?;
    let volumes = compute_shotgun_normalization_values_for_wells(
        &quantification.dna_concentration,
        &occupied,
        params,
    )?;

    let id = store.allocate_plate_id();
    let normalized = Plate::new(
        id,
        plate.name.clone(),
        plate.plate_type.clone(),
        created_by,
        PlateStage::NormalizedShotgun(NormalizedShotgunPlate {
            shotgun_plate_id,
            echo: echo.to_string(),
            input_dna: params.input_dna,
            sample_volume: volumes.sample,
            water_volume: volumes.water,
            library: None,
        }),
    );
    store.insert_plate(normalized)?;
    info!("normalized shotgun plate {} into plate {}", shotgun_plate_id, id);
    Ok(id)
}

///
/// The first pair of `technology` no library in the store uses yet.
///
pub fn first_unused_index_pair<S: PlateStore + ?Sized>(store: &S, technology: &str) -> Result<usize> {
    let mut next = 0;
    for id in store.plate_ids() {
        let plate = store.get_plate(id)?;
        let PlateStage::NormalizedShotgun(normalized) = &plate.stage else {
            continue;
        };
        let Some(library) = &normalized.library else {
            continue;
        };
        if library.index_technology != technology {
            continue;
        }
        if let Some(max) = library.indices.iter().flatten().map(|p| p.number).max() {
            next = next.max(max + 1);
        }
    }
    Ok(next)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryDetails {
    pub mosquito: String,
    pub kit: String,
    pub aliquot: String,
}

///
/// Prepare the libraries of a normalized plate: every well with sample gets
/// the next unused index pair of `technology`.
///
pub fn prepare_shotgun_libraries<S: PlateStore + ?Sized>(
    store: &mut S,
    normalized_plate_id: PlateId,
    technology: &IndexTechnology,
    details: &LibraryDetails,
) -> Result<WellMatrix<Option<IndexPair>>> {
    require_text(&details.mosquito, "Mosquito")?;
    require_text(&details.kit, "Library kit")?;
    require_text(&details.aliquot, "Aliquot")?;

    let mut plate = store.get_plate(normalized_plate_id)?;
    let normalized = plate.as_normalized_shotgun()?;
    if normalized.library.is_some() {
        return Err(PlateError::validation(format!(
            "The libraries of {} have already been prepared",
            plate
        )));
    }

    let start = first_unused_index_pair(store, &technology.name)?;
    let mut allocator = IndexAllocator::new(technology, start);
    let indices = assign_indices(&normalized.sample_volume, &mut allocator)?;

    if let PlateStage::NormalizedShotgun(normalized) = &mut plate.stage {
        normalized.library = Some(ShotgunLibrary {
            mosquito: details.mosquito.clone(),
            kit: details.kit.clone(),
            aliquot: details.aliquot.clone(),
            index_technology: technology.name.clone(),
            indices: indices.clone(),
        });
    }
    store.replace_plate(plate)?;
    info!(
        "prepared libraries of plate {} with {} starting at pair {}",
        normalized_plate_id, technology.name, start
    );
    Ok(indices)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoolingMethod {
    /// Volumes proportional to each library's share of the pool.
    Qpcr(PoolingParams),
    /// The same volume of every well, this many uL in total.
    EqualVolume(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShotgunPoolResult {
    pub pool_id: PoolId,
    pub concentrations: WellMatrix<f64>,
    /// nL taken from every well
    pub volumes: WellMatrix<f64>,
    pub estimate: PoolEstimate,
}

///
/// Pool a normalized plate whose libraries were prepared, driven by the qPCR
/// quantification of those libraries.
///
/// # Arguments
/// - cp: qPCR Cp per well, `None` for no call
/// - curve: the standard curve turning Cp values into nM
/// - method: how volumes are picked
/// - name: the name of the new pool
///
pub fn pool_shotgun_plate<S: PlateStore + ?Sized>(
    store: &mut S,
    normalized_plate_id: PlateId,
    cp: &WellMatrix<Option<f64>>,
    curve: &StandardCurve,
    method: PoolingMethod,
    name: &str,
) -> Result<ShotgunPoolResult> {
    require_text(name, "Pool name")?;

    let plate = store.get_plate(normalized_plate_id)?;
    if plate.as_normalized_shotgun()?.library.is_none() {
        return Err(PlateError::validation(format!(
            "The libraries of {} must be prepared before pooling",
            plate
        )));
    }
    plate.plate_type.check_shape(cp, "Cp matrix")?;

    let concentrations = compute_qpcr_concentration_calls(cp, curve)?;
    let volumes = match method {
        PoolingMethod::Qpcr(params) => {
            compute_shotgun_pooling_values_qpcr(&concentrations, None, &params)?
        }
        PoolingMethod::EqualVolume(total_vol) => {
            compute_shotgun_pooling_values_eqvol(&concentrations, total_vol)?.sample
        }
    };
    let estimate = estimate_pool_conc_vol(&volumes, &concentrations)?;

    let pool_volume = estimate.volume / UL_TO_NL;
    let id = store.allocate_pool_id();
    let pool = Pool::new(
        id,
        name,
        pool_volume,
        vec![PoolContribution {
            source_plate_id: normalized_plate_id,
            volume: pool_volume,
            percentage: 100.0,
        }],
    )?;
    store.insert_pool(pool)?;
    if estimate.concentration < 1.0 {
        warn!("pool {} is only {:.3} nM", name, estimate.concentration);
    }
    info!(
        "pooled plate {} into pool {}: {:.3} nM in {:.1} nL",
        normalized_plate_id, id, estimate.concentration, estimate.volume
    );

    Ok(ShotgunPoolResult {
        pool_id: id,
        concentrations,
        volumes,
        estimate,
    })
}
