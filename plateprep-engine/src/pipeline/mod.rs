//! Lineage transitions.
//!
//! Every transition reads its ancestors by identifier through a
//! [PlateStore], validates everything, and only then writes a single record.
//! A failed transition leaves the store untouched.

pub mod extraction;
pub mod sequencing;
pub mod shotgun;
pub mod targeted;

use fxhash::FxHashSet;

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::models::{Plate, PlateId};
use plateprep_core::store::PlateStore;

pub use self::extraction::*;
pub use self::sequencing::*;
pub use self::shotgun::*;
pub use self::targeted::*;

///
/// Every plate `id` was derived from, nearest first. Each ancestor appears
/// once even when reached through several paths.
///
pub fn ancestors<S: PlateStore + ?Sized>(store: &S, id: PlateId) -> Result<Vec<Plate>> {
    let mut seen = FxHashSet::default();
    let mut lineage = Vec::new();
    let mut frontier = store.get_plate(id)?.parents();

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for parent_id in frontier {
            if !seen.insert(parent_id) {
                continue;
            }
            let parent = store.get_plate(parent_id)?;
            next.extend(parent.parents());
            lineage.push(parent);
        }
        frontier = next;
    }
    Ok(lineage)
}

pub(crate) fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlateError::validation(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_positive(value: f64, field: &str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PlateError::validation(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }
    Ok(())
}
