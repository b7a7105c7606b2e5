//! Persistence seam.
//!
//! The core never talks to a database directly. Every transformation reads its
//! ancestors by identifier through [PlateStore] and writes one new record.

use fxhash::FxHashMap;
use tracing::debug;

use crate::errors::{PlateError, Result};
use crate::models::{Plate, PlateId, Pool, PoolId, RunId, SequencingRun};

pub trait PlateStore {
    fn allocate_plate_id(&mut self) -> PlateId;

    fn get_plate(&self, id: PlateId) -> Result<Plate>;

    /// Insert a new plate. Fails if the identifier is already taken.
    fn insert_plate(&mut self, plate: Plate) -> Result<()>;

    /// Overwrite an existing plate. Only used by the quantify, normalize and
    /// library-prep transitions.
    fn replace_plate(&mut self, plate: Plate) -> Result<()>;

    fn plate_ids(&self) -> Vec<PlateId>;

    fn allocate_pool_id(&mut self) -> PoolId;

    fn get_pool(&self, id: PoolId) -> Result<Pool>;

    fn insert_pool(&mut self, pool: Pool) -> Result<()>;

    fn allocate_run_id(&mut self) -> RunId;

    fn get_run(&self, id: RunId) -> Result<SequencingRun>;

    fn insert_run(&mut self, run: SequencingRun) -> Result<()>;

    fn replace_run(&mut self, run: SequencingRun) -> Result<()>;
}

///
/// In-memory [PlateStore], used by the command line and by tests.
///
#[derive(Debug, Default)]
pub struct MemoryPlateStore {
    plates: FxHashMap<PlateId, Plate>,
    pools: FxHashMap<PoolId, Pool>,
    runs: FxHashMap<RunId, SequencingRun>,
    last_plate_id: PlateId,
    last_pool_id: PoolId,
    last_run_id: RunId,
}

impl MemoryPlateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.plates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }
}

impl PlateStore for MemoryPlateStore {
    fn allocate_plate_id(&mut self) -> PlateId {
        self.last_plate_id += 1;
        self.last_plate_id
    }

    fn get_plate(&self, id: PlateId) -> Result<Plate> {
        self.plates
            .get(&id)
            .cloned()
            .ok_or(PlateError::NotFound { kind: "Plate", id })
    }

    fn insert_plate(&mut self, plate: Plate) -> Result<()> {
        if self.plates.contains_key(&plate.id) {
            return Err(PlateError::validation(format!(
                "Plate {} already exists",
                plate.id
            )));
        }
        debug!("storing {}", plate);
        self.plates.insert(plate.id, plate);
        Ok(())
    }

    fn replace_plate(&mut self, plate: Plate) -> Result<()> {
        match self.plates.get_mut(&plate.id) {
            Some(existing) => {
                debug!("updating {}", plate);
                *existing = plate;
                Ok(())
            }
            None => Err(PlateError::NotFound {
                kind: "Plate",
                id: plate.id,
            }),
        }
    }

    fn plate_ids(&self) -> Vec<PlateId> {
        let mut ids: Vec<PlateId> = self.plates.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn allocate_pool_id(&mut self) -> PoolId {
        self.last_pool_id += 1;
        self.last_pool_id
    }

    fn get_pool(&self, id: PoolId) -> Result<Pool> {
        self.pools
            .get(&id)
            .cloned()
            .ok_or(PlateError::NotFound { kind: "Pool", id })
    }

    fn insert_pool(&mut self, pool: Pool) -> Result<()> {
        if self.pools.contains_key(&pool.id) {
            return Err(PlateError::validation(format!(
                "Pool {} already exists",
                pool.id
            )));
        }
        self.pools.insert(pool.id, pool);
        Ok(())
    }

    fn allocate_run_id(&mut self) -> RunId {
        self.last_run_id += 1;
        self.last_run_id
    }

    fn get_run(&self, id: RunId) -> Result<SequencingRun> {
        self.runs
            .get(&id)
            .cloned()
            .ok_or(PlateError::NotFound {
                kind: "Sequencing run",
                id,
            })
    }

    fn insert_run(&mut self, run: SequencingRun) -> Result<()> {
        if self.runs.contains_key(&run.id) {
            return Err(PlateError::validation(format!(
                "Sequencing run {} already exists",
                run.id
            )));
        }
        self.runs.insert(run.id, run);
        Ok(())
    }

    fn replace_run(&mut self, run: SequencingRun) -> Result<()> {
        match self.runs.get_mut(&run.id) {
            Some(existing) => {
                *existing = run;
                Ok(())
            }
            None => Err(PlateError::NotFound {
                kind: "Sequencing run",
                id: run.id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::geometry::PlateType;
    use crate::models::{PlateStage, SamplePlate};

    fn sample_plate(id: PlateId) -> Plate {
        Plate::new(
            id,
            format!("plate {}", id),
            PlateType::well_96(),
            "test@foo.bar",
            PlateStage::Sample(SamplePlate {
                studies: vec![1],
                layout: None,
            }),
        )
    }

    #[rstest]
    fn test_insert_and_get() {
        let mut store = MemoryPlateStore::new();
        let id = store.allocate_plate_id();
        store.insert_plate(sample_plate(id)).unwrap();
        assert_eq!(store.get_plate(id).unwrap().name, "plate 1");
        assert_eq!(store.plate_ids(), vec![1]);
    }

    #[rstest]
    fn test_duplicate_insert_fails() {
        let mut store = MemoryPlateStore::new();
        store.insert_plate(sample_plate(1)).unwrap();
        assert!(store.insert_plate(sample_plate(1)).is_err());
    }

    #[rstest]
    fn test_missing_plate() {
        let store = MemoryPlateStore::new();
        let err = store.get_plate(42).unwrap_err();
        assert_eq!(err.to_string(), "Plate 42 does not exist");
    }

    #[rstest]
    fn test_replace_requires_existing() {
        let mut store = MemoryPlateStore::new();
        assert!(matches!(
            store.replace_plate(sample_plate(5)),
            Err(PlateError::NotFound { .. })
        ));
    }
}
