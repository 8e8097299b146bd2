//! The resolution-tagged time series container
//!
//! A `TimeSeries` moves through three states:
//!
//! ```text
//! Idle ──accept──▶ Collecting ──finalize──▶ Final
//!                    ▲      │
//!                    └accept┘
//! ```
//!
//! While collecting, values land in a chunked buffer. Finalizing copies them
//! once into a contiguous array and drops the chunks. Final series are
//! read-only; resampling and concatenation always allocate a new series.

use crate::series::chunk::ChunkBuffer;
use crate::series::error::{SeriesError, SeriesResult};
use crate::series::resample;
use crate::series::types::{
    Sample, SeriesState, DEFAULT_RESOLUTION, DEFAULT_START_OFFSET, MINUTES_PER_DAY,
};
use chrono::NaiveTime;
use std::fmt;

/// Backing store; exactly one representation exists at a time
#[derive(Debug, Clone, Default)]
enum Storage<T> {
    #[default]
    Idle,
    Collecting(ChunkBuffer<T>),
    Final(Vec<T>),
}

/// Fixed-cadence series of one scalar type
#[derive(Debug, Clone)]
pub struct TimeSeries<T> {
    label: String,
    /// Minutes per sample, always >= 1
    resolution: u32,
    /// Minutes after 00:00 UTC of the first sample
    start_offset: u32,
    storage: Storage<T>,
}

impl<T: Sample> TimeSeries<T> {
    /// Create an empty series with the default resolution and start offset
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_params(label, DEFAULT_RESOLUTION, DEFAULT_START_OFFSET)
    }

    /// Create an empty series with declared parameters
    ///
    /// A zero resolution falls back to the default.
    pub fn with_params(label: impl Into<String>, resolution: u32, start_offset: u32) -> Self {
        let label = label.into();
        let resolution = if resolution == 0 {
            tracing::warn!(label = %label, "resolution must be positive, using default");
            DEFAULT_RESOLUTION
        } else {
            resolution
        };

        Self {
            label,
            resolution,
            start_offset,
            storage: Storage::Idle,
        }
    }

    /// Build a series that is final from the start
    pub(crate) fn from_values(
        label: impl Into<String>,
        resolution: u32,
        start_offset: u32,
        values: Vec<T>,
    ) -> Self {
        Self {
            label: label.into(),
            resolution: resolution.max(1),
            start_offset,
            storage: Storage::Final(values),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn start_offset(&self) -> u32 {
        self.start_offset
    }

    /// Start offset as a UTC wall-clock time
    pub fn start_time(&self) -> NaiveTime {
        let minutes = self.start_offset % MINUTES_PER_DAY;
        NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0).unwrap_or_default()
    }

    /// Number of accepted values
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Idle => 0,
            Storage::Collecting(buffer) => buffer.len(),
            Storage::Final(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> SeriesState {
        match self.storage {
            Storage::Idle => SeriesState::Idle,
            Storage::Collecting(_) => SeriesState::Collecting,
            Storage::Final(_) => SeriesState::Final,
        }
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.storage, Storage::Collecting(_))
    }

    pub fn is_final(&self) -> bool {
        matches!(self.storage, Storage::Final(_))
    }

    /// Accept the next value
    ///
    /// The hints only matter for the first value of a series still at the
    /// default parameters: a positive resolution hint and any start hint
    /// are adopted then, and fixed for the life of the series.
    pub fn accept(
        &mut self,
        value: T,
        resolution_hint: Option<u32>,
        start_hint: Option<u32>,
    ) -> SeriesResult<()> {
        if self.is_final() {
            tracing::warn!(label = %self.label, "rejecting value for finalized series");
            return Err(SeriesError::AlreadyFinal {
                label: self.label.clone(),
            });
        }

        if let Storage::Idle = self.storage {
            if self.resolution == DEFAULT_RESOLUTION && self.start_offset == DEFAULT_START_OFFSET {
                if let Some(resolution) = resolution_hint.filter(|r| *r > 0) {
                    self.resolution = resolution;
                }
                if let Some(start) = start_hint {
                    self.start_offset = start;
                }
            }
            tracing::debug!(
                label = %self.label,
                resolution = self.resolution,
                start_offset = self.start_offset,
                "series collecting"
            );
            self.storage = Storage::Collecting(ChunkBuffer::new());
        }

        if let Storage::Collecting(buffer) = &mut self.storage {
            buffer.push(value);
        }
        Ok(())
    }

    /// Accept a value with no parameter hints
    pub fn push(&mut self, value: T) -> SeriesResult<()> {
        self.accept(value, None, None)
    }

    /// Accept a value, refusing missing readings
    pub fn accept_checked(&mut self, value: T) -> SeriesResult<()> {
        if value.is_missing() {
            tracing::warn!(label = %self.label, "rejecting missing value");
            return Err(SeriesError::NullValue {
                label: self.label.clone(),
            });
        }
        self.push(value)
    }

    /// Freeze the collected values into a contiguous array
    pub fn finalize(&mut self) -> SeriesResult<()> {
        match std::mem::take(&mut self.storage) {
            Storage::Idle => {
                tracing::warn!(label = %self.label, "finalize requested on series with no data");
                Err(SeriesError::NotCollecting {
                    label: self.label.clone(),
                })
            }
            Storage::Final(values) => {
                self.storage = Storage::Final(values);
                tracing::warn!(label = %self.label, "series was already finalized");
                Err(SeriesError::AlreadyFinal {
                    label: self.label.clone(),
                })
            }
            Storage::Collecting(buffer) => {
                let chunks = buffer.chunk_count();
                let values = buffer.into_contiguous();
                tracing::debug!(
                    label = %self.label,
                    len = values.len(),
                    chunks,
                    "series finalized"
                );
                self.storage = Storage::Final(values);
                Ok(())
            }
        }
    }

    /// The finalized values; `None` until the series is final
    pub fn values(&self) -> Option<&[T]> {
        match &self.storage {
            Storage::Final(values) => Some(values),
            _ => None,
        }
    }

    /// Derive a new final series at another cadence
    ///
    /// `None` selects the default resolution or start offset. A source that
    /// is not yet final yields an empty idle series.
    pub fn derive_at(
        &self,
        resolution: Option<u32>,
        start_offset: Option<u32>,
        label: impl Into<String>,
    ) -> SeriesResult<TimeSeries<T>> {
        let label = label.into();
        let resolution = resolution.filter(|r| *r > 0).unwrap_or(DEFAULT_RESOLUTION);
        let start_offset = start_offset.unwrap_or(DEFAULT_START_OFFSET);

        if !self.is_final() {
            tracing::warn!(label = %self.label, state = %self.state(), "deriving from unfinished series");
            return Ok(TimeSeries::with_params(label, resolution, start_offset));
        }

        resample::resample_labeled(self, resolution, start_offset, label)
    }

    /// Concatenate `other` after this series into a new series
    pub fn append(&self, other: &TimeSeries<T>) -> SeriesResult<TimeSeries<T>> {
        let (left, right) = self.concat_operands(other)?;

        let mut values = Vec::with_capacity(left.len() + right.len());
        values.extend_from_slice(left);
        values.extend_from_slice(right);

        Ok(TimeSeries::from_values(
            self.label.clone(),
            self.resolution,
            self.start_offset,
            values,
        ))
    }

    /// Concatenate `other` onto this series in place
    pub fn extend(&mut self, other: &TimeSeries<T>) -> SeriesResult<()> {
        self.concat_operands(other)?;
        let right = other.values().unwrap_or_default();

        if let Storage::Final(values) = &mut self.storage {
            values.extend_from_slice(right);
        }
        Ok(())
    }

    fn concat_operands<'a>(&'a self, other: &'a TimeSeries<T>) -> SeriesResult<(&'a [T], &'a [T])> {
        let (left, right) = match (self.values(), other.values()) {
            (Some(left), Some(right)) => (left, right),
            _ => {
                tracing::debug!(left = %self, right = %other, "refusing to join unfinished series");
                return Err(SeriesError::IncompatibleSeries(format!(
                    "'{}' and '{}' must both be final",
                    self.label, other.label
                )));
            }
        };

        if self.resolution != other.resolution || self.start_offset != other.start_offset {
            return Err(SeriesError::IncompatibleSeries(format!(
                "'{}' is {} min from {}, '{}' is {} min from {}",
                self.label,
                self.resolution,
                self.start_offset,
                other.label,
                other.resolution,
                other.start_offset
            )));
        }

        Ok((left, right))
    }
}

impl<T: Sample> fmt::Display for TimeSeries<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} values.", self.label, self.len())?;
        match self.state() {
            SeriesState::Final => write!(f, " Final."),
            SeriesState::Collecting => write!(f, " Collecting."),
            SeriesState::Idle => Ok(()),
        }
    }
}
