mod common;

mod condense {
    pub mod cli;
    pub mod handlers;
}
mod index {
    pub mod cli;
    pub mod handlers;
}
mod normalize {
    pub mod cli;
    pub mod handlers;
}
mod pool {
    pub mod cli;
    pub mod handlers;
}
mod sheet {
    pub mod cli;
    pub mod handlers;
}

use anyhow::Result;
use clap::Command;
use tracing_subscriber::EnvFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "plateprep";
    pub const DEFAULT_LOG_FILTER: &str = "info";
    pub const DATE_FORMAT: &str = "%Y-%m-%d";
    /// Recorded as the creator of records built from the command line.
    pub const CLI_USER: &str = "plateprep-cli";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("labadmin")
        .about("Robot pick lists and sample sheets for amplicon and shotgun sequencing prep.")
        .subcommand_required(true)
        .subcommand(condense::cli::create_condense_cli())
        .subcommand(normalize::cli::create_normalize_cli())
        .subcommand(pool::cli::create_pool_cli())
        .subcommand(index::cli::create_index_cli())
        .subcommand(sheet::cli::create_sheet_cli())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(consts::DEFAULT_LOG_FILTER));
    // logs go to stderr, stdout is reserved for the generated files
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        //
        // CONDENSE
        //
        Some((condense::cli::CONDENSE_CMD, matches)) => condense::handlers::run_condense(matches),

        //
        // NORMALIZE
        //
        Some((normalize::cli::NORMALIZE_CMD, matches)) => {
            normalize::handlers::run_normalize(matches)
        }

        //
        // POOL
        //
        Some((pool::cli::POOL_CMD, matches)) => pool::handlers::run_pool(matches),

        //
        // INDEX
        //
        Some((index::cli::INDEX_CMD, matches)) => index::handlers::run_index(matches),

        //
        // SAMPLE SHEET
        //
        Some((sheet::cli::SHEET_CMD, matches)) => sheet::handlers::run_sheet(matches),

        _ => unreachable!("Subcommand not found"),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let matches = build_parser().get_matches();
    run(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::{read_to_string, write};
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    fn data(path: &str) -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../tests/data")
            .join(path)
            .to_string_lossy()
            .to_string()
    }

    fn run_args(args: &[&str]) -> Result<()> {
        let mut argv = vec![consts::BIN_NAME];
        argv.extend_from_slice(args);
        let matches = build_parser().try_get_matches_from(argv)?;
        run(&matches)
    }

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[rstest]
    fn test_parser_is_valid() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_condense() {
        let dir = tempdir().unwrap();
        let out = path_str(&dir.path().join("condensed.csv"));
        let layouts: Vec<String> = (1..=4)
            .map(|i| data(&format!("layouts/plate_{}.csv", i)))
            .collect();

        let mut args = vec!["condense"];
        args.extend(layouts.iter().map(String::as_str));
        args.extend(["--output", out.as_str()]);
        run_args(&args).unwrap();

        let contents = read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 16);
        assert!(lines[0].starts_with("1.s01A,2.s01A,1.s02A,2.s02A"));
        assert!(lines[1].starts_with("3.s01A,4.s01A,3.s02A,4.s02A"));
        // H12 of the fourth plate is empty
        assert!(lines[15].ends_with("3.s12H,"));
    }

    #[rstest]
    fn test_condense_too_many_layouts() {
        let layout = data("layouts/plate_1.csv");
        let mut args = vec!["condense"];
        args.extend([layout.as_str(); 5]);
        assert!(run_args(&args).is_err());
    }

    #[rstest]
    fn test_normalize() {
        let dir = tempdir().unwrap();
        let out = path_str(&dir.path().join("normalize.csv"));
        let export = data("plate_reader/picogreen_96.txt");
        let config = data("protocol.toml");
        run_args(&[
            "normalize",
            export.as_str(),
            "--config",
            config.as_str(),
            "--output",
            out.as_str(),
        ])
        .unwrap();

        let contents = read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "Source Plate Name,Source Plate Type,Source Well,Concentration,Transfer Volume,Destination Plate Name,Destination Well"
        );
        // A1 is at 19.768 ng/uL: 5 ng is 252.93 nL of sample
        assert!(lines.iter().any(|l| l.starts_with("1,384LDV_AQ_B2_HT,A1,,252.93,NormalizedDNA,A1")));
        assert!(lines.iter().any(|l| l.starts_with("water,384LDV_AQ_B2_HT,A1,,3247.07,NormalizedDNA,A1")));
    }

    #[rstest]
    fn test_pool_with_estimate() {
        let dir = tempdir().unwrap();
        let out = path_str(&dir.path().join("pool.csv"));
        let estimate = path_str(&dir.path().join("estimate.json"));
        let cp = data("qpcr/kapa_cp.csv");
        run_args(&[
            "pool",
            cp.as_str(),
            "--equal-volume",
            "--output",
            out.as_str(),
            "--estimate",
            estimate.as_str(),
        ])
        .unwrap();

        let estimate: serde_json::Value =
            serde_json::from_str(&read_to_string(&estimate).unwrap()).unwrap();
        let concentration = estimate["concentration"].as_f64().unwrap();
        assert!((concentration - 323.873027979).abs() < 1e-6);
        assert!((estimate["volume"].as_f64().unwrap() - 60000.0).abs() < 1e-6);

        let contents = read_to_string(&out).unwrap();
        // one line per well of the export plus the header
        assert_eq!(contents.lines().count(), 13);
        assert!(contents.lines().all(|l| l.ends_with(",A1") || l.starts_with("Source")));
    }

    #[rstest]
    fn test_pool_partial_export() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("cp.csv");
        write(&export, "Pos,Cp\nA1,10.14\nA2,\nB1,7.86\n").unwrap();
        let export = path_str(&export);
        let out = path_str(&dir.path().join("pool.csv"));

        // without a plate size every well of the inferred 2x2 plate is needed
        let err = run_args(&["pool", export.as_str(), "--output", out.as_str()]).unwrap_err();
        assert_eq!(err.to_string(), "Well B2 is missing from the qPCR export");

        run_args(&[
            "pool",
            export.as_str(),
            "--wells",
            "96",
            "--output",
            out.as_str(),
        ])
        .unwrap();
        let contents = read_to_string(&out).unwrap();
        let sources: Vec<&str> = contents
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(2).unwrap())
            .collect();
        // the A2 "no call" is left out of the pool
        assert_eq!(sources, vec!["A1", "B1"]);
    }

    #[rstest]
    fn test_pool_epmotion() {
        let dir = tempdir().unwrap();
        let out = path_str(&dir.path().join("pool.csv"));
        let cp = data("qpcr/kapa_cp.csv");
        run_args(&[
            "pool",
            cp.as_str(),
            "--equal-volume",
            "--epmotion",
            "2",
            "--output",
            out.as_str(),
        ])
        .unwrap();

        let contents = read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Rack,Source,Rack,Destination,Volume,Tool");
        assert_eq!(lines[1], "1,a1,1,2,5.000,1");
    }

    #[rstest]
    fn test_index() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("reader.txt");
        write(&export, "Curve0.5\tY=A*X+B\n\n20.0\t10.0\n5.0\t0.0001\n").unwrap();
        let export = path_str(&export);
        let out = path_str(&dir.path().join("index.csv"));
        let config = data("protocol.toml");

        run_args(&[
            "index",
            export.as_str(),
            "--technology",
            "iTru",
            "--start",
            "2",
            "--config",
            config.as_str(),
            "--output",
            out.as_str(),
        ])
        .unwrap();

        let contents = read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        // 4 wells, one i7 and one i5 transfer each
        assert_eq!(lines.len(), 9);
        assert!(lines[1].starts_with("IndexSourcei7,384LDV_AQ_B2_HT,C13,,250.000,IndexedDNAPlate,A1"));
    }

    #[rstest]
    fn test_index_unknown_technology() {
        let export = data("plate_reader/picogreen_96.txt");
        let config = data("protocol.toml");
        let err = run_args(&["index", export.as_str(), "--technology", "TruSeq", "--config", config.as_str()])
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown index technology: TruSeq");
    }

    #[rstest]
    fn test_index_not_enough_pairs() {
        let export = data("plate_reader/picogreen_96.txt");
        let config = data("protocol.toml");
        let err = run_args(&["index", export.as_str(), "--technology", "iTru", "--config", config.as_str()])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Index technology iTru has 8 index pairs left but 96 wells need one"
        );
    }

    #[rstest]
    fn test_sheet() {
        let dir = tempdir().unwrap();
        let out = path_str(&dir.path().join("sheet.csv"));
        let run = data("runs/hiseq_shotgun.toml");
        run_args(&[
            "sheet",
            run.as_str(),
            "--date",
            "2017-02-13",
            "--output",
            out.as_str(),
        ])
        .unwrap();

        let contents = read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "[Header],,,,,,,,,,");
        assert_eq!(lines[4], "Date,02/13/2017,,,,,demo@microbio.me,shared@foo.bar,,,");
        assert_eq!(lines[8], "Description,labadmin ID,42,,,,,,,,");
        assert_eq!(
            lines[lines.len() - 1],
            "2,3.s01A,,,,iTru7_101_03,TGAGGTGT,iTru5_01_A,ACCGACAA,,"
        );
    }

    #[rstest]
    fn test_sheet_bad_date() {
        let run = data("runs/hiseq_shotgun.toml");
        assert!(run_args(&["sheet", run.as_str(), "--date", "13/02/2017"]).is_err());
    }
}
