use chrono::Utc;
use tracing::{debug, info};

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::Well;
use plateprep_core::models::*;
use plateprep_core::store::PlateStore;

use super::require_text;
use super::shotgun::condensed_layout;

/// Everything needed to register a sequencing run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
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
    pub contacts: Vec<Contact>,
}

pub fn create_sequencing_run<S: PlateStore + ?Sized>(
    store: &mut S,
    request: RunRequest,
    created_by: &str,
) -> Result<RunId> {
    require_text(&request.name, "Run name")?;
    require_text(&request.assay, "Assay")?;
    require_text(&request.reagent_kit_type, "Reagent kit type")?;
    require_text(&request.reagent_kit_lot, "Reagent kit lot")?;
    store.get_pool(request.pool_id)?;

    let mut run = SequencingRun {
        id: 0,
        pool_id: request.pool_id,
        name: request.name,
        platform: request.platform,
        run_type: request.run_type,
        assay: request.assay,
        fwd_cycles: request.fwd_cycles,
        rev_cycles: request.rev_cycles,
        reagent_kit_type: request.reagent_kit_type,
        reagent_kit_lot: request.reagent_kit_lot,
        principal_investigator: request.principal_investigator,
        contacts: request.contacts,
        state: RunState::Pending,
        created_by: created_by.to_string(),
        created_on: Utc::now(),
    };
    run.validate()?;

    run.id = store.allocate_run_id();
    let id = run.id;
    info!("created sequencing run {} ({}) for pool {}", id, run.name, run.pool_id);
    store.insert_run(run)?;
    Ok(id)
}

///
/// Move a run along `Pending -> Running -> Complete`, or to `Failed`.
///
pub fn advance_sequencing_run<S: PlateStore + ?Sized>(
    store: &mut S,
    run_id: RunId,
    next: RunState,
) -> Result<()> {
    let mut run = store.get_run(run_id)?;
    run.advance(next)?;
    info!("sequencing run {} is now {:?}", run_id, next);
    store.replace_run(run)
}

///
/// Sample sheet rows of a shotgun pool: one per indexed well holding a
/// sample, for every normalized plate of the pool.
///
/// # Arguments
/// - pool_id: the pool being sequenced
/// - lane: the lane of every row, for lane addressed instruments
///
pub fn shotgun_sheet_samples<S: PlateStore + ?Sized>(
    store: &S,
    pool_id: PoolId,
    lane: Option<u32>,
) -> Result<Vec<SheetSample>> {
    let pool = store.get_pool(pool_id)?;
    let mut samples = Vec::new();

    for plate_id in pool.source_plate_ids() {
        let plate = store.get_plate(plate_id)?;
        let normalized = plate.as_normalized_shotgun()?;
        let library = normalized.library.as_ref().ok_or_else(|| {
            PlateError::validation(format!("The libraries of {} were never prepared", plate))
        })?;
        let layout = condensed_layout(store, normalized.shotgun_plate_id)?;

        for ((row, col), pair) in library.indices.indexed_iter() {
            let Some(pair) = pair else {
                continue;
            };
            let sample_id = layout
                .get((row, col))
                .and_then(|w| w.as_ref())
                .and_then(|w| w.sample_id.as_deref());
            match sample_id {
                Some(sample_id) => {
                    samples.push(SheetSample::from_index_pair(sample_id, pair, lane))
                }
                None => {
                    let well = Well::new(row, col).label()?;
                    debug!(
                        "skipping well {} of plate {}, it has an index but no sample",
                        well, plate_id
                    );
                }
            }
        }
    }
    Ok(samples)
}
