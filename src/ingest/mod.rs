//! Text ingestion
//!
//! Instrument files are whitespace-separated columns under a free-form
//! header. The header ends at an artifact line of dashes:
//!
//! ```text
//! :Product: 20100716_ace_mag_1m.txt
//! #  YR MO DA  HHMM    Day      Day    S     Bx     By ...
//! #-------------------------------------------------------
//! 2010 07 16  0000   55393      0      0    -2.3    1.6 ...
//! ```
//!
//! A `ColumnLayout` names the columns of one instrument and the decoder
//! turns each data line into a registry row.
//!
//! NTP WWV/H clock statistics have no header. Their `wwv5` lines each
//! carry one station, so the `clk-stats` layout feeds two columns per line
//! instead of a full row.

mod clock_stats;
mod decoder;
mod layout;

pub use clock_stats::STATIONS;
pub use decoder::{Decoded, IngestReport, TextDecoder};
pub use layout::{ColumnLayout, LayoutFormat};

use crate::series::SeriesError;
use thiserror::Error;

/// Errors raised while decoding instrument files
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The header terminator never appeared
    #[error("No '{artifact}' header line found for layout {layout}")]
    MissingArtifact { layout: String, artifact: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("Unknown layout '{0}', expected one of: {known}", known = ColumnLayout::names().join(", "))]
    UnknownLayout(String),
}

/// Result type alias for ingestion
pub type IngestResult<T> = Result<T, IngestError>;
