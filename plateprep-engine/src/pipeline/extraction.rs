use tracing::info;

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::geometry::{PlateType, WellMatrix};
use plateprep_core::models::{DnaPlate, Plate, PlateId, PlateStage, SamplePlate, SampleWell};
use plateprep_core::store::PlateStore;

use super::require_text;

pub type SampleLayout = WellMatrix<Option<SampleWell>>;

///
/// Register an empty sample plate.
///
pub fn create_sample_plate<S: PlateStore + ?Sized>(
    store: &mut S,
    name: &str,
    plate_type: PlateType,
    created_by: &str,
    studies: Vec<u32>,
    notes: Option<String>,
) -> Result<PlateId> {
    require_text(name, "Plate name")?;
    require_text(created_by, "created_by")?;

    let id = store.allocate_plate_id();
    let mut plate = Plate::new(
        id,
        name,
        plate_type,
        created_by,
        PlateStage::Sample(SamplePlate {
            studies,
            layout: None,
        }),
    );
    plate.notes = notes;
    store.insert_plate(plate)?;
    info!("created sample plate {} ({})", id, name);
    Ok(id)
}

///
/// Store the sample layout of a sample plate. The layout must have the
/// dimensions of the plate type.
///
pub fn write_sample_plate_layout<S: PlateStore + ?Sized>(
    store: &mut S,
    plate_id: PlateId,
    layout: SampleLayout,
) -> Result<()> {
    let mut plate = store.get_plate(plate_id)?;
    plate.as_sample()?;
    plate.plate_type.check_shape(&layout, "layout")?;

    if let PlateStage::Sample(sample) = &mut plate.stage {
        sample.layout = Some(layout);
    }
    store.replace_plate(plate)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionDetails {
    pub robot: String,
    pub kit_lot: String,
    pub tool: String,
    pub notes: Option<String>,
}

///
/// Record the extraction of sample plates. Each sample plate gives one DNA
/// plate with the same name and plate type.
///
/// Returns the new DNA plate identifiers, in the order of `sample_plate_ids`.
///
pub fn extract_sample_plates<S: PlateStore + ?Sized>(
    store: &mut S,
    sample_plate_ids: &[PlateId],
    details: &ExtractionDetails,
    created_by: &str,
) -> Result<Vec<PlateId>> {
    if sample_plate_ids.is_empty() {
        return Err(PlateError::validation(
            "Provide at least one sample plate to extract",
        ));
    }
    require_text(&details.robot, "Extraction robot")?;
    require_text(&details.kit_lot, "Extraction kit lot")?;
    require_text(&details.tool, "Extraction tool")?;
    require_text(created_by, "created_by")?;

    let sample_plates = sample_plate_ids
        .iter()
        .map(|id| {
            let plate = store.get_plate(*id)?;
            plate.as_sample()?;
            Ok(plate)
        })
        .collect::<Result<Vec<Plate>>>()?;

    let mut dna_plate_ids = Vec::with_capacity(sample_plates.len());
    for sample_plate in sample_plates {
        let id = store.allocate_plate_id();
        let mut plate = Plate::new(
            id,
            sample_plate.name.clone(),
            sample_plate.plate_type.clone(),
            created_by,
            PlateStage::Dna(DnaPlate {
                sample_plate_id: sample_plate.id,
                extraction_robot: details.robot.clone(),
                extraction_kit_lot: details.kit_lot.clone(),
                extraction_tool: details.tool.clone(),
            }),
        );
        plate.notes = details.notes.clone();
        store.insert_plate(plate)?;
        info!("extracted sample plate {} into DNA plate {}", sample_plate.id, id);
        dna_plate_ids.push(id);
    }
    Ok(dna_plate_ids)
}

///
/// The sample layout of a sample plate, or of the sample plate a DNA plate was
/// extracted from. `None` when no layout was written.
///
pub fn sample_layout<S: PlateStore + ?Sized>(
    store: &S,
    plate_id: PlateId,
) -> Result<Option<SampleLayout>> {
    let plate = store.get_plate(plate_id)?;
    let sample_plate = match &plate.stage {
        PlateStage::Sample(_) => plate,
        PlateStage::Dna(dna) => store.get_plate(dna.sample_plate_id)?,
        _ => {
            return Err(PlateError::validation(format!(
                "{} doesn't carry a sample layout",
                plate
            )));
        }
    };
    Ok(sample_plate.as_sample()?.layout.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::Array2;
    use plateprep_core::store::MemoryPlateStore;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn details() -> ExtractionDetails {
        ExtractionDetails {
            robot: "HOWE_KF1".to_string(),
            kit_lot: "PM16B11".to_string(),
            tool: "108379Z".to_string(),
            notes: None,
        }
    }

    #[fixture]
    fn store() -> MemoryPlateStore {
        let mut store = MemoryPlateStore::new();
        create_sample_plate(&mut store, "Test plate 1", PlateType::well_96(), "test@foo.bar", vec![1], None)
            .unwrap();
        store
    }

    #[rstest]
    fn test_write_sample_plate_layout(mut store: MemoryPlateStore) {
        let mut layout: SampleLayout = Array2::from_elem((8, 12), None);
        layout[[0, 0]] = Some(SampleWell::with_sample("1.SKB1.640202"));
        write_sample_plate_layout(&mut store, 1, layout).unwrap();

        let obs = sample_layout(&store, 1).unwrap().unwrap();
        assert_eq!(obs[[0, 0]].as_ref().and_then(|w| w.sample_id.as_deref()), Some("1.SKB1.640202"));
    }

    #[rstest]
    fn test_write_layout_wrong_shape(mut store: MemoryPlateStore) {
        let layout: SampleLayout = Array2::from_elem((16, 24), None);
        let err = write_sample_plate_layout(&mut store, 1, layout).unwrap_err();
        assert!(err.to_string().starts_with("The layout doesn't match the plate type dimensions"));
        assert_eq!(sample_layout(&store, 1).unwrap(), None);
    }

    #[rstest]
    fn test_extract_sample_plates(mut store: MemoryPlateStore) {
        let ids = extract_sample_plates(&mut store, &[1], &details(), "test@foo.bar").unwrap();
        assert_eq!(ids, vec![2]);

        let dna = store.get_plate(2).unwrap();
        assert_eq!(dna.name, "Test plate 1");
        assert_eq!(dna.as_dna().unwrap().sample_plate_id, 1);
        assert_eq!(dna.parents(), vec![1]);
    }

    #[rstest]
    fn test_extract_nothing(mut store: MemoryPlateStore) {
        let err = extract_sample_plates(&mut store, &[], &details(), "test@foo.bar").unwrap_err();
        assert_eq!(err.to_string(), "Provide at least one sample plate to extract");
    }

    #[rstest]
    fn test_extract_is_all_or_nothing(mut store: MemoryPlateStore) {
        let err = extract_sample_plates(&mut store, &[1, 42], &details(), "test@foo.bar").unwrap_err();
        assert_eq!(err.to_string(), "Plate 42 does not exist");
        assert_eq!(store.len(), 1);
    }

    #[rstest]
    fn test_extract_dna_plate(mut store: MemoryPlateStore) {
        extract_sample_plates(&mut store, &[1], &details(), "test@foo.bar").unwrap();
        let err = extract_sample_plates(&mut store, &[2], &details(), "test@foo.bar").unwrap_err();
        assert_eq!(err.to_string(), "Plate 2 is a DNA plate, expected a Sample plate");
    }
}
