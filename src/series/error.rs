//! Series error types
//!
//! Every failing series operation returns one of these and leaves the
//! series involved untouched.

use thiserror::Error;

/// Errors raised by series, resampling, correlation and registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    /// The series was finalized and no longer accepts values
    #[error("Series '{label}' is already final")]
    AlreadyFinal { label: String },

    /// Finalize was requested before any value was accepted
    #[error("Series '{label}' has no collected values to finalize")]
    NotCollecting { label: String },

    /// A missing value (NaN) was offered to a series
    #[error("Series '{label}' rejected a missing value")]
    NullValue { label: String },

    /// Concatenation operands are not both final or disagree on cadence
    #[error("Incompatible series: {0}")]
    IncompatibleSeries(String),

    /// Resampling would yield no samples
    #[error("Invalid resample parameters: resolution {resolution}, start {start_offset} over {source_len} samples")]
    InvalidResampleParameters {
        resolution: u32,
        start_offset: u32,
        source_len: usize,
    },

    /// A correlation operand was absent or not final
    #[error("Missing {0} series")]
    NullSeries(&'static str),

    /// Correlation operands were sampled at different cadences
    #[error("Resolution mismatch: short {short} min, long {long} min")]
    ResolutionMismatch { short: u32, long: u32 },

    /// The short correlation operand holds more samples than the long one
    #[error("Short series has {short} values, long series only {long}")]
    ShortSeriesTooLong { short: usize, long: usize },

    /// An integer correlation sum left the range of `i64`
    #[error("Correlation overflowed at delay {delay}")]
    Overflow { delay: usize },

    /// No column with this label was declared
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The column's declared type disagrees with the value or request
    #[error("Column '{label}' holds {found} values, not {expected}")]
    TypeMismatch {
        label: String,
        expected: String,
        found: String,
    },
}

/// Result type alias for series operations
pub type SeriesResult<T> = Result<T, SeriesError>;
