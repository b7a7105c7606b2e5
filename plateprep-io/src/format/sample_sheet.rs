//! Illumina sample sheets (IEM file version 4).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use plateprep_core::errors::{PlateError, Result};
use plateprep_core::models::{InstrumentType, RunType, SequencingRun, SheetSample};

use crate::consts::SHEET_DATE_FORMAT;

const DATA_TARGET_GENE_HEADER: &str = "Sample_ID,Sample_Name,Sample_Plate,Sample_Well,I7_Index_ID,index,Sample_Project,Description,,";
const DATA_SHOTGUN_HEADER: &str = "Sample_ID,Sample_Name,Sample_Plate,Sample_Well,I7_Index_ID,index,I5_Index_ID,index2,Sample_Project,Description";
/// Target gene runs are demultiplexed downstream, the sheet holds a dummy index.
const TARGET_GENE_INDEX: &str = "NNNNNNNNNNNN";

fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(PlateError::validation(format!("{} is required", field)));
    }
    Ok(value)
}

fn format_header_block(run: &SequencingRun, date: NaiveDate) -> Result<Vec<String>> {
    let run_name = require(&run.name, "run_name")?;
    let assay = require(&run.assay, "assay")?;
    let pi_name = require(&run.principal_investigator.name, "pi_name")?;
    let pi_email = require(&run.principal_investigator.email, "pi_email")?;
    let first = run
        .contacts
        .first()
        .ok_or_else(|| PlateError::validation("contact_0_name is required"))?;
    require(&first.name, "contact_0_name")?;
    require(&first.email, "contact_0_email")?;

    let name = |i: usize| run.contacts.get(i).map(|c| c.name.as_str()).unwrap_or("");
    let email = |i: usize| run.contacts.get(i).map(|c| c.email.as_str()).unwrap_or("");

    Ok(vec![
        "[Header],,,,,,,,,,".to_string(),
        "IEMFileVersion,4,,,,,,,,,".to_string(),
        format!("Investigator Name,{},,,,PI,{},{},,,", pi_name, pi_name, pi_email),
        format!(
            "Experiment Name,{},,,,Contact,{},{},{},,",
            run_name,
            name(0),
            name(1),
            name(2)
        ),
        format!(
            "Date,{},,,,,{},{},{},,",
            date.format(SHEET_DATE_FORMAT),
            email(0),
            email(1),
            email(2)
        ),
        "Workflow,GenerateFASTQ,,,,,,,,,".to_string(),
        "Application,FASTQ Only,,,,,,,,,".to_string(),
        format!("Assay,{},,,,,,,,,", assay),
        format!("Description,labadmin ID,{},,,,,,,,", run.id),
        "Chemistry,Default,,,,,,,,,".to_string(),
        ",,,,,,,,,,".to_string(),
        "[Reads],,,,,,,,,,".to_string(),
        format!("{},,,,,,,,,,", run.fwd_cycles),
        format!("{},,,,,,,,,,", run.rev_cycles),
        ",,,,,,,,,,".to_string(),
        "[Settings],,,,,,,,,,".to_string(),
        "ReverseComplement,0,,,,,,,,,".to_string(),
        ",,,,,,,,,,".to_string(),
        "[Data],,,,,,,,,,".to_string(),
    ])
}

fn sample_lane(sample: &SheetSample) -> Result<u32> {
    sample.lane.ok_or_else(|| {
        PlateError::validation(format!(
            "Sample {} doesn't have a lane, which is required for lane addressed instruments",
            sample.sample_id
        ))
    })
}

///
/// Render the `[Data]` table: its header line followed by one line per row.
///
fn format_data_table(run: &SequencingRun, samples: &[SheetSample]) -> Result<Vec<String>> {
    let lane_addressed = run.platform.is_lane_addressed();
    let (prefix, suffix) = match run.platform {
        InstrumentType::MiSeq => ("", ","),
        InstrumentType::HiSeq => ("Lane,", ""),
    };
    let header = match run.run_type {
        RunType::TargetGene => DATA_TARGET_GENE_HEADER,
        RunType::Shotgun => DATA_SHOTGUN_HEADER,
    };

    let mut lines = vec![format!("{}{}{}", prefix, header, suffix)];
    match (run.run_type, lane_addressed) {
        (RunType::TargetGene, true) => {
            let lanes = samples
                .iter()
                .map(sample_lane)
                .collect::<Result<BTreeSet<u32>>>()?;
            for (idx, lane) in lanes.iter().enumerate() {
                // one row per lane, each with its own run name
                lines.push(format!(
                    "{},{}{},,,,,{},,,,,",
                    lane, run.name, idx, TARGET_GENE_INDEX
                ));
            }
        }
        (RunType::TargetGene, false) => {
            lines.push(format!("{},,,,,{},,,,,{}", run.name, TARGET_GENE_INDEX, suffix));
        }
        (RunType::Shotgun, _) => {
            for sample in samples {
                let lane = if lane_addressed {
                    format!("{},", sample_lane(sample)?)
                } else {
                    String::new()
                };
                lines.push(format!(
                    "{}{},,,,{},{},{},{},,{}",
                    lane,
                    sample.sample_id,
                    sample.i7_index_id,
                    sample.i7_index,
                    sample.i5_index_id,
                    sample.i5_index,
                    suffix
                ));
            }
        }
    }
    Ok(lines)
}

///
/// Render the sample sheet of a sequencing run.
///
/// For target gene runs the samples only matter on lane addressed instruments,
/// where one row is written per distinct lane. Shotgun runs get one row per
/// sample with its i7 and i5 indices.
///
/// # Arguments
/// - run: the sequencing run; its identifier is written as the labadmin ID
/// - samples: the rows of the data table
/// - date: the date written in the header
///
pub fn format_sample_sheet(
    run: &SequencingRun,
    samples: &[SheetSample],
    date: NaiveDate,
) -> Result<String> {
    run.validate()?;

    let mut lines = format_header_block(run, date)?;
    let data = format_data_table(run, samples)?;
    debug!(
        "sample sheet for run {} has {} data rows",
        run.name,
        data.len() - 1
    );
    lines.extend(data);

    let mut sheet = lines.join("\n");
    sheet.push('\n');
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use plateprep_core::models::{Contact, RunState};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn contact(name: &str, email: &str) -> Contact {
        Contact {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    fn sample(id: &str, suffix: &str, lane: Option<u32>) -> SheetSample {
        SheetSample {
            sample_id: id.to_string(),
            lane,
            i7_index_id: format!("i7id{}", suffix),
            i7_index: format!("i7{}", suffix),
            i5_index_id: format!("i5id{}", suffix),
            i5_index: format!("i5{}", suffix),
        }
    }

    #[fixture]
    fn run() -> SequencingRun {
        SequencingRun {
            id: 1,
            pool_id: 1,
            name: "runname".to_string(),
            platform: InstrumentType::MiSeq,
            run_type: RunType::TargetGene,
            assay: "Kapa Hyper Plus".to_string(),
            fwd_cycles: 151,
            rev_cycles: 151,
            reagent_kit_type: "MiSeq v3 150 cycle".to_string(),
            reagent_kit_lot: "RKL0042".to_string(),
            principal_investigator: contact("Knight", "theknight@somewhere.org"),
            contacts: vec![contact("contact", "contact@place.com")],
            state: RunState::Pending,
            created_by: "test@foo.bar".to_string(),
            created_on: Utc::now(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 2, 13).unwrap()
    }

    #[rstest]
    fn test_header_block(run: SequencingRun) {
        let obs = format_sample_sheet(&run, &[], date()).unwrap();
        let lines: Vec<&str> = obs.lines().collect();
        assert_eq!(lines[0], "[Header],,,,,,,,,,");
        assert_eq!(
            lines[2],
            "Investigator Name,Knight,,,,PI,Knight,theknight@somewhere.org,,,"
        );
        assert_eq!(lines[3], "Experiment Name,runname,,,,Contact,contact,,,,");
        assert_eq!(lines[4], "Date,02/13/2017,,,,,contact@place.com,,,,");
        assert_eq!(lines[8], "Description,labadmin ID,1,,,,,,,,");
        assert_eq!(lines[12], "151,,,,,,,,,,");
        assert_eq!(lines[18], "[Data],,,,,,,,,,");
        assert!(obs.ends_with('\n'));
    }

    #[rstest]
    fn test_miseq_target_gene(run: SequencingRun) {
        let obs = format_sample_sheet(&run, &[SheetSample::default()], date()).unwrap();
        let lines: Vec<&str> = obs.lines().collect();
        assert_eq!(lines[lines.len() - 1], "runname,,,,,NNNNNNNNNNNN,,,,,,");
        assert_eq!(
            lines[lines.len() - 2],
            "Sample_ID,Sample_Name,Sample_Plate,Sample_Well,I7_Index_ID,index,Sample_Project,Description,,,"
        );
    }

    #[rstest]
    fn test_hiseq_target_gene(mut run: SequencingRun) {
        run.platform = InstrumentType::HiSeq;
        let samples: Vec<SheetSample> = [1, 2, 1, 3]
            .iter()
            .map(|lane| SheetSample {
                lane: Some(*lane),
                ..Default::default()
            })
            .collect();
        let obs = format_sample_sheet(&run, &samples, date()).unwrap();
        let lines: Vec<&str> = obs.lines().rev().take(4).collect();
        assert_eq!(
            lines,
            vec![
                "3,runname2,,,,,NNNNNNNNNNNN,,,,,",
                "2,runname1,,,,,NNNNNNNNNNNN,,,,,",
                "1,runname0,,,,,NNNNNNNNNNNN,,,,,",
                "Lane,Sample_ID,Sample_Name,Sample_Plate,Sample_Well,I7_Index_ID,index,Sample_Project,Description,,",
            ]
        );
    }

    #[rstest]
    fn test_miseq_shotgun(mut run: SequencingRun) {
        run.run_type = RunType::Shotgun;
        let samples = vec![sample("s1", "a", None), sample("s2", "b", Some(4))];
        let obs = format_sample_sheet(&run, &samples, date()).unwrap();
        let lines: Vec<&str> = obs.lines().rev().take(3).collect();
        assert_eq!(
            lines,
            vec![
                "s2,,,,i7idb,i7b,i5idb,i5b,,,",
                "s1,,,,i7ida,i7a,i5ida,i5a,,,",
                "Sample_ID,Sample_Name,Sample_Plate,Sample_Well,I7_Index_ID,index,I5_Index_ID,index2,Sample_Project,Description,",
            ]
        );
    }

    #[rstest]
    fn test_hiseq_shotgun(mut run: SequencingRun) {
        run.platform = InstrumentType::HiSeq;
        run.run_type = RunType::Shotgun;
        let samples = vec![
            sample("s1", "a", Some(1)),
            sample("s3", "c", Some(2)),
            sample("s4", "d", Some(1)),
            sample("s2", "b", Some(2)),
        ];
        let obs = format_sample_sheet(&run, &samples, date()).unwrap();
        let lines: Vec<&str> = obs.lines().rev().take(5).collect();
        assert_eq!(
            lines,
            vec![
                "2,s2,,,,i7idb,i7b,i5idb,i5b,,",
                "1,s4,,,,i7idd,i7d,i5idd,i5d,,",
                "2,s3,,,,i7idc,i7c,i5idc,i5c,,",
                "1,s1,,,,i7ida,i7a,i5ida,i5a,,",
                "Lane,Sample_ID,Sample_Name,Sample_Plate,Sample_Well,I7_Index_ID,index,I5_Index_ID,index2,Sample_Project,Description",
            ]
        );
    }

    #[rstest]
    fn test_hiseq_sample_without_lane(mut run: SequencingRun) {
        run.platform = InstrumentType::HiSeq;
        let err = format_sample_sheet(&run, &[sample("s1", "a", None)], date()).unwrap_err();
        assert!(matches!(err, PlateError::Validation(_)));
    }

    #[rstest]
    #[case::fwd(0, 151, "fwd_cycles must be > 0")]
    #[case::rev(151, 0, "rev_cycles must be > 0")]
    fn test_bad_cycles(
        mut run: SequencingRun,
        #[case] fwd: u32,
        #[case] rev: u32,
        #[case] expected: &str,
    ) {
        run.fwd_cycles = fwd;
        run.rev_cycles = rev;
        let err = format_sample_sheet(&run, &[], date()).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn test_missing_assay(mut run: SequencingRun) {
        run.assay = String::new();
        let err = format_sample_sheet(&run, &[], date()).unwrap_err();
        assert_eq!(err.to_string(), "assay is required");
    }

    #[rstest]
    #[case::no_email("c1", "", "email is missing for c1")]
    #[case::no_name("", "c1@place.com", "name is missing for c1@place.com")]
    fn test_one_sided_extra_contact(
        mut run: SequencingRun,
        #[case] name: &str,
        #[case] email: &str,
        #[case] expected: &str,
    ) {
        run.contacts.push(contact(name, email));
        let err = format_sample_sheet(&run, &[], date()).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn test_three_contacts(mut run: SequencingRun) {
        run.contacts.push(contact("c1", "c1@place.com"));
        run.contacts.push(contact("c2", "c2@place.com"));
        let obs = format_sample_sheet(&run, &[], date()).unwrap();
        let lines: Vec<&str> = obs.lines().collect();
        assert_eq!(lines[3], "Experiment Name,runname,,,,Contact,contact,c1,c2,,");
        assert_eq!(
            lines[4],
            "Date,02/13/2017,,,,,contact@place.com,c1@place.com,c2@place.com,,"
        );
    }
}
