use thiserror::Error;

/// Error type shared by every plateprep crate.
///
/// Errors are raised to the caller unmodified: nothing in the core retries or
/// recovers silently.
#[derive(Error, Debug)]
pub enum PlateError {
    /// Malformed or out-of-range caller input.
    #[error("{0}")]
    Validation(String),

    /// Instrument export is missing a header/section or has unparseable fields.
    #[error("{0}")]
    Parse(String),

    /// A renormalization or average had nothing left to divide by.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Geometry exceeds single-letter row addressing.
    #[error("{0}")]
    Range(String),

    #[error("{kind} {id} does not exist")]
    NotFound { kind: &'static str, id: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PlateError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PlateError::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        PlateError::Parse(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PlateError>;
