pub mod index;
pub mod plate;
pub mod pool;
pub mod run;

// re-export for cleaner imports
pub use self::index::{IndexPair, IndexPrimer};
pub use self::plate::{
    DnaPlate, NormalizedShotgunPlate, Plate, PlateId, PlateStage, Quantification, QuadrantSource,
    SamplePlate, SampleWell, ShotgunLibrary, ShotgunPlate, TargetedPlate,
};
pub use self::pool::{Pool, PoolContribution, PoolId};
pub use self::run::{Contact, InstrumentType, RunId, RunState, RunType, SequencingRun, SheetSample};
