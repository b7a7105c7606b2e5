// standard curve of the KAPA library quantification kit
pub const DEFAULT_CURVE_SLOPE: f64 = -3.231;
pub const DEFAULT_CURVE_INTERCEPT: f64 = 12.059;
pub const DEFAULT_DILUTION_FACTOR: f64 = 25000.0;

// qPCR pooling, concentrations in nM
pub const DEFAULT_MIN_CONC: f64 = 10.0;
pub const DEFAULT_FLOOR_CONC: f64 = 50.0;
pub const DEFAULT_TOTAL_NMOL: f64 = 0.01;

/// uL pooled from a plate when every well contributes the same volume.
pub const DEFAULT_EQUAL_VOLUME_TOTAL: f64 = 60.0;

// shotgun normalization
pub const DEFAULT_INPUT_VOLUME: f64 = 3.5;
pub const DEFAULT_INPUT_DNA: f64 = 10.0;

/// Wells with less sample than this (uL) don't get an index pair.
pub const MIN_INDEX_VOLUME: f64 = 0.0001;
pub const DEFAULT_INDEX_VOLUME: f64 = 250.0;

pub const UL_TO_NL: f64 = 1000.0;
pub const NL_TO_L: f64 = 1e-9;
