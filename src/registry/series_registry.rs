//! Series registry
//!
//! Owns one series per declared column. Decoders feed it rows while the
//! series collect; after `finalize_all` callers fetch series by label,
//! optionally at another cadence. Derived copies are kept for the
//! registry's lifetime so every handed-out `Arc` has a retained owner.

use crate::registry::column::{AnySeries, ColumnSpec, RegistrySample, RowValue};
use crate::series::{Sample, SampleKind, SeriesError, SeriesResult, TimeSeries, MINUTES_PER_DAY};
use std::collections::HashMap;
use std::cell::RefCell;
use std::sync::Arc;

/// Cache key for derived series
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DerivedKey {
    label: String,
    resolution: u32,
    start_offset: u32,
}

/// Outcome of finalizing every column
#[derive(Debug, Clone, Default)]
pub struct FinalizeSummary {
    /// Columns that moved to Final
    pub finalized: usize,
    /// Zero values appended to reach a full day
    pub padded: usize,
    /// Columns that could not be finalized, with the reason
    pub failed: Vec<(String, SeriesError)>,
}

/// Registry of the series decoded from one source
#[derive(Debug)]
pub struct SeriesRegistry {
    columns: Vec<ColumnSpec>,
    /// Parallel to `columns`; `None` for ignored columns
    series: Vec<Option<AnySeries>>,
    /// Filled lazily by `get_series`, which only borrows the registry
    derived: RefCell<HashMap<DerivedKey, AnySeries>>,
}

impl SeriesRegistry {
    /// Create one idle series per non-ignored column
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        let series = columns
            .iter()
            .map(|col| match col.kind {
                SampleKind::Int => Some(AnySeries::Int(Arc::new(TimeSeries::with_params(
                    col.label.clone(),
                    col.resolution,
                    col.start_offset,
                )))),
                SampleKind::Double => Some(AnySeries::Double(Arc::new(TimeSeries::with_params(
                    col.label.clone(),
                    col.resolution,
                    col.start_offset,
                )))),
                SampleKind::Ignore => None,
            })
            .collect();

        Self {
            columns,
            series,
            derived: RefCell::new(HashMap::new()),
        }
    }

    /// Declared columns in source order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Number of declared columns, ignored ones included
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    /// Stored series for a column, whatever its type
    pub fn stored(&self, label: &str) -> Option<&AnySeries> {
        self.position(label).and_then(|idx| self.series[idx].as_ref())
    }

    /// Accept one value into the named column
    pub fn accept<T: RegistrySample>(&mut self, label: &str, value: T) -> SeriesResult<()> {
        let idx = self
            .position(label)
            .ok_or_else(|| SeriesError::UnknownColumn(label.to_string()))?;
        self.accept_at(idx, value)
    }

    fn accept_at<T: RegistrySample>(&mut self, idx: usize, value: T) -> SeriesResult<()> {
        let col = &self.columns[idx];
        let slot = self.series[idx].as_mut().ok_or_else(|| SeriesError::TypeMismatch {
            label: col.label.clone(),
            expected: T::KIND.to_string(),
            found: col.kind.to_string(),
        })?;
        let series = T::unwrap_mut(slot).ok_or_else(|| SeriesError::TypeMismatch {
            label: col.label.clone(),
            expected: T::KIND.to_string(),
            found: col.kind.to_string(),
        })?;

        // Only final series are ever shared
        let series = Arc::get_mut(series).ok_or_else(|| SeriesError::AlreadyFinal {
            label: col.label.clone(),
        })?;
        series.accept(value, Some(col.resolution), Some(col.start_offset))
    }

    /// Accept a full row, one cell per declared column
    ///
    /// The row is checked against the declarations before any column is
    /// touched, so a rejected row leaves every series unchanged.
    pub fn accept_row(&mut self, row: &[RowValue]) -> SeriesResult<()> {
        if row.len() != self.columns.len() {
            return Err(SeriesError::IncompatibleSeries(format!(
                "row has {} cells, {} columns declared",
                row.len(),
                self.columns.len()
            )));
        }

        for (col, cell) in self.columns.iter().zip(row) {
            if col.kind != cell.kind() {
                return Err(SeriesError::TypeMismatch {
                    label: col.label.clone(),
                    expected: cell.kind().to_string(),
                    found: col.kind.to_string(),
                });
            }
        }

        if let Some(any) = self.series.iter().flatten().find(|s| s.is_final()) {
            return Err(SeriesError::AlreadyFinal {
                label: any.label().to_string(),
            });
        }

        for (idx, cell) in row.iter().enumerate() {
            match *cell {
                RowValue::Int(v) => self.accept_at(idx, v)?,
                RowValue::Double(v) => self.accept_at(idx, v)?,
                RowValue::Skip => {}
            }
        }
        Ok(())
    }

    /// Finalize every column
    ///
    /// With `pad_to_day`, each column is first filled with zeros up to a
    /// full UTC day at its resolution. Failures are logged and collected;
    /// they do not stop the remaining columns.
    pub fn finalize_all(&mut self, pad_to_day: bool) -> FinalizeSummary {
        let mut summary = FinalizeSummary::default();

        for (col, slot) in self.columns.iter().zip(self.series.iter_mut()) {
            let Some(any) = slot.as_mut() else {
                continue;
            };

            let result = match any {
                AnySeries::Int(s) => finalize_one(s, col, pad_to_day),
                AnySeries::Double(s) => finalize_one(s, col, pad_to_day),
            };

            match result {
                Ok(padded) => {
                    summary.finalized += 1;
                    summary.padded += padded;
                }
                Err(e) => {
                    tracing::warn!(label = %col.label, error = %e, "column not finalized");
                    summary.failed.push((col.label.clone(), e));
                }
            }
        }

        tracing::debug!(
            finalized = summary.finalized,
            padded = summary.padded,
            failed = summary.failed.len(),
            "registry finalized"
        );
        summary
    }

    /// Fetch a final series by label
    ///
    /// `None` for resolution or start offset keeps the stored value. When
    /// the effective request matches the stored series, the stored `Arc`
    /// is returned; otherwise a resampled copy is created once, cached and
    /// returned. Returns `None` for unknown labels, type mismatches,
    /// unfinished series and resample failures.
    pub fn get_series<T: RegistrySample>(
        &self,
        label: &str,
        resolution: Option<u32>,
        start_offset: Option<u32>,
    ) -> Option<Arc<TimeSeries<T>>> {
        let idx = self.position(label)?;
        let col = &self.columns[idx];
        if col.kind != T::KIND {
            tracing::warn!(
                label,
                expected = %T::KIND,
                found = %col.kind,
                "series type mismatch"
            );
            return None;
        }

        let stored = T::unwrap(self.series[idx].as_ref()?)?;
        if !stored.is_final() {
            tracing::debug!(label, state = %stored.state(), "series not final yet");
            return None;
        }

        let resolution = resolution.filter(|r| *r > 0).unwrap_or(stored.resolution());
        let start_offset = start_offset.unwrap_or(stored.start_offset());
        if resolution == stored.resolution() && start_offset == stored.start_offset() {
            return Some(Arc::clone(stored));
        }

        let key = DerivedKey {
            label: label.to_string(),
            resolution,
            start_offset,
        };
        let mut derived = self.derived.borrow_mut();
        if let Some(cached) = derived.get(&key).and_then(T::unwrap) {
            return Some(Arc::clone(cached));
        }

        match stored.derive_at(Some(resolution), Some(start_offset), stored.label()) {
            Ok(series) => {
                tracing::debug!(label, resolution, start_offset, len = series.len(), "derived series");
                let series = Arc::new(series);
                derived.insert(key, T::wrap(Arc::clone(&series)));
                Some(series)
            }
            Err(e) => {
                tracing::warn!(label, resolution, start_offset, error = %e, "resample failed");
                None
            }
        }
    }

    /// Fetch a final series by label when its type is only known at runtime
    pub fn get_any(
        &self,
        label: &str,
        resolution: Option<u32>,
        start_offset: Option<u32>,
    ) -> Option<AnySeries> {
        let idx = self.position(label)?;
        match self.columns[idx].kind {
            SampleKind::Int => self
                .get_series::<i64>(label, resolution, start_offset)
                .map(AnySeries::Int),
            SampleKind::Double => self
                .get_series::<f64>(label, resolution, start_offset)
                .map(AnySeries::Double),
            SampleKind::Ignore => None,
        }
    }

    /// Number of derived series currently retained
    pub fn derived_count(&self) -> usize {
        self.derived.borrow().len()
    }

    /// Drop the registry's references to derived series
    pub fn release_derived(&self) -> usize {
        let mut derived = self.derived.borrow_mut();
        let released = derived.len();
        derived.clear();
        released
    }
}

fn finalize_one<T: Sample>(
    series: &mut Arc<TimeSeries<T>>,
    col: &ColumnSpec,
    pad_to_day: bool,
) -> SeriesResult<usize> {
    let series = Arc::get_mut(series).ok_or_else(|| SeriesError::AlreadyFinal {
        label: col.label.clone(),
    })?;
    if series.is_final() {
        return Err(SeriesError::AlreadyFinal {
            label: col.label.clone(),
        });
    }

    let mut padded = 0;
    if pad_to_day {
        let per_day = (MINUTES_PER_DAY / col.resolution.max(1)) as usize;
        while series.len() < per_day {
            series.accept(T::zero(), Some(col.resolution), Some(col.start_offset))?;
            padded += 1;
        }
    }

    series.finalize()?;
    Ok(padded)
}
