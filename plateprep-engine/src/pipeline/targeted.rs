//! Target gene branch: library prep, quantification and pooling.

use tracing::info;

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::WellMatrix;
use plateprep_core::models::*;
use plateprep_core::store::PlateStore;

use super::{require_positive, require_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateLink {
    pub dna_plate_id: PlateId,
    pub primer_plate_id: PlateId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetedLibraryDetails {
    pub robot: String,
    pub tm300_8_tool: String,
    pub tm50_8_tool: String,
    pub master_mix_lot: String,
    pub water_lot: String,
}

///
/// Record the target gene library prep of DNA plates, one new plate per link.
/// Each library plate takes the name of its DNA plate.
///
pub fn prepare_targeted_libraries<S: PlateStore + ?Sized>(
    store: &mut S,
    links: &[PlateLink],
    details: &TargetedLibraryDetails,
    created_by: &str,
) -> Result<Vec<PlateId>> {
    if links.is_empty() {
        return Err(PlateError::validation(
            "Provide at least one DNA - Primer plate link",
        ));
    }
    require_text(&details.robot, "Processing robot")?;
    require_text(&details.tm300_8_tool, "TM300-8 tool")?;
    require_text(&details.tm50_8_tool, "TM50-8 tool")?;
    require_text(&details.master_mix_lot, "Master mix lot")?;
    require_text(&details.water_lot, "Water lot")?;

    let dna_plates = links
        .iter()
        .map(|link| {
            let plate = store.get_plate(link.dna_plate_id)?;
            plate.as_dna()?;
            Ok((plate, link.primer_plate_id))
        })
        .collect::<Result<Vec<(Plate, PlateId)>>>()?;

    let mut ids = Vec::with_capacity(dna_plates.len());
    for (dna_plate, primer_plate_id) in dna_plates {
        let id = store.allocate_plate_id();
        store.insert_plate(Plate::new(
            id,
            dna_plate.name.clone(),
            dna_plate.plate_type.clone(),
            created_by,
            PlateStage::Targeted(TargetedPlate {
                dna_plate_id: dna_plate.id,
                primer_plate_id,
                robot: details.robot.clone(),
                tm300_8_tool: details.tm300_8_tool.clone(),
                tm50_8_tool: details.tm50_8_tool.clone(),
                master_mix_lot: details.master_mix_lot.clone(),
                water_lot: details.water_lot.clone(),
                raw_concentration: None,
                mod_concentration: None,
            }),
        ))?;
        ids.push(id);
    }
    info!("prepared {} target gene library plates", ids.len());
    Ok(ids)
}

///
/// Attach the raw library concentrations to a target gene plate.
///
pub fn quantify_targeted_plate<S: PlateStore + ?Sized>(
    store: &mut S,
    plate_id: PlateId,
    raw_concentration: WellMatrix<f64>,
) -> Result<()> {
    let mut plate = store.get_plate(plate_id)?;
    if plate.as_targeted()?.raw_concentration.is_some() {
        return Err(PlateError::validation(format!(
            "{} has already been quantified",
            plate
        )));
    }
    plate.plate_type.check_shape(&raw_concentration, "concentration matrix")?;

    if let PlateStage::Targeted(targeted) = &mut plate.stage {
        targeted.raw_concentration = Some(raw_concentration);
    }
    store.replace_plate(plate)
}

///
/// Store the checked (modified) concentrations of a quantified target gene
/// plate. Checking again replaces the previous values.
///
pub fn check_targeted_plate<S: PlateStore + ?Sized>(
    store: &mut S,
    plate_id: PlateId,
    mod_concentration: WellMatrix<f64>,
) -> Result<()> {
    let mut plate = store.get_plate(plate_id)?;
    if plate.as_targeted()?.raw_concentration.is_none() {
        return Err(PlateError::validation(format!(
            "{} must be quantified before it can be checked",
            plate
        )));
    }
    plate.plate_type.check_shape(&mod_concentration, "concentration matrix")?;

    if let PlateStage::Targeted(targeted) = &mut plate.stage {
        targeted.mod_concentration = Some(mod_concentration);
    }
    store.replace_plate(plate)
}

///
/// Pool target gene plates.
///
/// # Arguments
/// - name: the name of the pool
/// - volume: total uL of the pool
/// - contributions: how much of each target gene plate goes in
///
pub fn pool_plates<S: PlateStore + ?Sized>(
    store: &mut S,
    name: &str,
    volume: f64,
    contributions: Vec<PoolContribution>,
) -> Result<PoolId> {
    require_text(name, "Pool name")?;
    require_positive(volume, "Pool volume")?;
    for contribution in &contributions {
        store.get_plate(contribution.source_plate_id)?.as_targeted()?;
    }

    let id = store.allocate_pool_id();
    let pool = Pool::new(id, name, volume, contributions)?;
    let n_plates = pool.contributions.len();
    store.insert_pool(pool)?;
    info!("pooled {} target gene plates into pool {}", n_plates, id);
    Ok(id)
}
