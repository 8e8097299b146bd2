//! Time series layer
//!
//! - **types**: `Sample` scalar trait, `SampleKind`, `SeriesState`
//! - **chunk**: fixed-capacity chunk buffer used while collecting
//! - **time_series**: the `TimeSeries<T>` container and its lifecycle
//! - **resample**: deriving coarser series from final ones
//! - **error**: error types
//!
//! # Lifecycle
//!
//! ```text
//! decoder ─accept─▶ TimeSeries (Collecting, chunked)
//!                      │ finalize
//!                      ▼
//!                 TimeSeries (Final, contiguous) ─resample─▶ new Final series
//! ```
//!
//! # Example
//!
//! ```rust
//! use crosscorr::series::{resample, TimeSeries};
//!
//! let mut bx: TimeSeries<f64> = TimeSeries::new("BX");
//! for minute in 0..1440 {
//!     bx.accept(minute as f64 * 0.1, Some(1), Some(0)).unwrap();
//! }
//! bx.finalize().unwrap();
//!
//! let five_minute = resample(&bx, 5, 0).unwrap();
//! assert_eq!(five_minute.len(), 288);
//! ```

pub mod chunk;
pub mod error;
pub mod resample;
pub mod time_series;
pub mod types;

pub use chunk::{ChunkBuffer, CHUNK_CAPACITY};
pub use error::{SeriesError, SeriesResult};
pub use resample::{resample, resample_labeled, ResampleMode};
pub use time_series::TimeSeries;
pub use types::{
    Sample, SampleKind, SeriesState, DEFAULT_RESOLUTION, DEFAULT_START_OFFSET, MINUTES_PER_DAY,
};
