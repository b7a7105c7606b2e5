/// Row letters are single ASCII letters, so a plate can have at most 26 rows.
pub const MAX_ROWS: usize = 26;

pub const PLATE_96_ID: u32 = 1;
pub const PLATE_96_NAME: &str = "96-well";
pub const PLATE_96_ROWS: usize = 8;
pub const PLATE_96_COLS: usize = 12;

pub const PLATE_384_ID: u32 = 2;
pub const PLATE_384_NAME: &str = "384-well";
pub const PLATE_384_ROWS: usize = 16;
pub const PLATE_384_COLS: usize = 24;

/// Number of source plates a condensed plate can hold.
pub const QUADRANTS: usize = 4;
