//! Series registry
//!
//! The boundary between decoders and analysis:
//!
//! - **ColumnSpec**: declared label, scalar type and cadence of a column
//! - **AnySeries**: a stored series of either scalar type
//! - **SeriesRegistry**: one series per column, lookup by label with
//!   transparent resampling and cached derived copies
//!
//! ```text
//! decoder rows ─▶ accept_row ─▶ [TimeSeries per column] ─▶ finalize_all
//!                                                              │
//! caller ─ get_series(label, res, start) ◀─────────────────────┘
//!            │ res/start differ?
//!            └──▶ resample ─▶ derived cache (kept until release_derived / drop)
//! ```

mod column;
mod series_registry;

pub use column::{AnySeries, ColumnSpec, RegistrySample, RowValue};
pub use series_registry::{FinalizeSummary, SeriesRegistry};
