//! # crosscorr
//!
//! Fixed-cadence space-weather telemetry: typed, resolution-tagged time
//! series, derivation of coarser series and time-lag cross-correlation.
//!
//! ## Modules
//!
//! - [`series`]: the `TimeSeries` container, its lifecycle and resampling
//! - [`correlate`]: sliding-window cross-correlation of two final series
//! - [`registry`]: one series per column, fetched by label at any cadence
//! - [`ingest`]: decoders for the instrument text products
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use crosscorr::correlate::cross_correlate;
//! use crosscorr::registry::{ColumnSpec, SeriesRegistry};
//!
//! let mut registry = SeriesRegistry::new(vec![
//!     ColumnSpec::double("BZ", 1),
//!     ColumnSpec::double("SPEED", 1),
//! ]);
//! for minute in 0..60 {
//!     registry.accept("BZ", (minute % 7) as f64).unwrap();
//!     registry.accept("SPEED", (minute % 5) as f64).unwrap();
//! }
//! registry.finalize_all(false);
//!
//! // both at five-minute cadence
//! let bz = registry.get_series::<f64>("BZ", Some(5), None).unwrap();
//! let speed = registry.get_series::<f64>("SPEED", Some(5), None).unwrap();
//! assert_eq!(bz.len(), 12);
//!
//! let corr = cross_correlate(Some(bz.as_ref()), Some(speed.as_ref())).unwrap();
//! assert_eq!(corr.len(), 1);
//! ```

pub mod config;
pub mod correlate;
pub mod ingest;
pub mod registry;
pub mod series;

// Re-export top-level types for convenience
pub use series::{
    resample, ResampleMode, Sample, SampleKind, SeriesError, SeriesResult, SeriesState,
    TimeSeries,
};

pub use correlate::{
    cross_correlate, cross_correlate_any, Correlation, CorrelationReport, Promote, RESULT_LABEL,
};

pub use registry::{AnySeries, ColumnSpec, FinalizeSummary, SeriesRegistry};

pub use ingest::{
    ColumnLayout, Decoded, IngestError, IngestReport, IngestResult, LayoutFormat, TextDecoder,
};

pub use config::{Config, ConfigError, LoggingConfig};
