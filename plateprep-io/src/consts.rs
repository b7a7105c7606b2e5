/// Transfers below this volume are skipped by the robots, so they are left out
/// of every pick list.
pub const MIN_TRANSFER_VOLUME: f64 = 0.001;

pub const ECHO_HEADER: &str = "Source Plate Name,Source Plate Type,Source Well,Concentration,Transfer Volume,Destination Plate Name,Destination Well";
pub const ECHO_SOURCE_PLATE_TYPE: &str = "384LDV_AQ_B2_HT";
pub const ECHO_WATER_PLATE: &str = "water";
pub const ECHO_SAMPLE_PLATE: &str = "1";
pub const ECHO_NORMALIZED_PLATE: &str = "NormalizedDNA";
pub const ECHO_INDEXED_PLATE: &str = "IndexedDNAPlate";
pub const ECHO_I7_SOURCE_PLATE: &str = "IndexSourcei7";
pub const ECHO_I5_SOURCE_PLATE: &str = "IndexSourcei5";
/// Every sample of a pooling pick list lands in this well.
pub const ECHO_POOL_DESTINATION: &str = "A1";

pub const EPMOTION_HEADER: &str = "Rack,Source,Rack,Destination,Volume,Tool";

pub const QPCR_POSITION_HEADER: &str = "Pos";
pub const QPCR_CP_HEADER: &str = "Cp";

pub const ECHO_RUN_ID_KEY: &str = "Run ID";
pub const ECHO_EXCEPTIONS_SECTION: &str = "[EXCEPTIONS]";
pub const ECHO_DETAILS_SECTION: &str = "[DETAILS]";

pub const SHEET_DATE_FORMAT: &str = "%m/%d/%Y";
