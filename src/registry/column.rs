//! Column declarations and the typed series variant

use crate::series::{Sample, SampleKind, TimeSeries, DEFAULT_RESOLUTION, DEFAULT_START_OFFSET};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Declaration of one data column: label, scalar type and cadence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSpec {
    pub label: String,
    pub kind: SampleKind,
    /// Minutes per sample
    pub resolution: u32,
    /// Minutes after 00:00 UTC of the first sample
    pub start_offset: u32,
}

impl ColumnSpec {
    pub fn new(label: impl Into<String>, kind: SampleKind, resolution: u32, start_offset: u32) -> Self {
        Self {
            label: label.into(),
            kind,
            resolution,
            start_offset,
        }
    }

    /// Integer column
    pub fn int(label: impl Into<String>, resolution: u32) -> Self {
        Self::new(label, SampleKind::Int, resolution, DEFAULT_START_OFFSET)
    }

    /// Floating point column
    pub fn double(label: impl Into<String>, resolution: u32) -> Self {
        Self::new(label, SampleKind::Double, resolution, DEFAULT_START_OFFSET)
    }

    /// Column present in the source but not stored
    pub fn ignore(label: impl Into<String>) -> Self {
        Self::new(label, SampleKind::Ignore, DEFAULT_RESOLUTION, DEFAULT_START_OFFSET)
    }

    /// Builder: set start offset
    pub fn start_offset(mut self, start_offset: u32) -> Self {
        self.start_offset = start_offset;
        self
    }

    pub fn is_ignored(&self) -> bool {
        self.kind == SampleKind::Ignore
    }
}

/// One parsed cell of a data row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowValue {
    Int(i64),
    Double(f64),
    /// Cell of an ignored column
    Skip,
}

impl RowValue {
    pub fn kind(&self) -> SampleKind {
        match self {
            RowValue::Int(_) => SampleKind::Int,
            RowValue::Double(_) => SampleKind::Double,
            RowValue::Skip => SampleKind::Ignore,
        }
    }
}

/// A stored series of either scalar type
#[derive(Debug, Clone)]
pub enum AnySeries {
    Int(Arc<TimeSeries<i64>>),
    Double(Arc<TimeSeries<f64>>),
}

impl AnySeries {
    pub fn kind(&self) -> SampleKind {
        match self {
            AnySeries::Int(_) => SampleKind::Int,
            AnySeries::Double(_) => SampleKind::Double,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AnySeries::Int(s) => s.label(),
            AnySeries::Double(s) => s.label(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnySeries::Int(s) => s.len(),
            AnySeries::Double(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resolution(&self) -> u32 {
        match self {
            AnySeries::Int(s) => s.resolution(),
            AnySeries::Double(s) => s.resolution(),
        }
    }

    pub fn start_offset(&self) -> u32 {
        match self {
            AnySeries::Int(s) => s.start_offset(),
            AnySeries::Double(s) => s.start_offset(),
        }
    }

    pub fn is_final(&self) -> bool {
        match self {
            AnySeries::Int(s) => s.is_final(),
            AnySeries::Double(s) => s.is_final(),
        }
    }

    /// True when both variants point at the same allocation
    pub fn ptr_eq(&self, other: &AnySeries) -> bool {
        match (self, other) {
            (AnySeries::Int(a), AnySeries::Int(b)) => Arc::ptr_eq(a, b),
            (AnySeries::Double(a), AnySeries::Double(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Scalar types the registry can store, mapping each to its variant
pub trait RegistrySample: Sample {
    fn wrap(series: Arc<TimeSeries<Self>>) -> AnySeries;
    fn unwrap(any: &AnySeries) -> Option<&Arc<TimeSeries<Self>>>;
    fn unwrap_mut(any: &mut AnySeries) -> Option<&mut Arc<TimeSeries<Self>>>;
}

impl RegistrySample for i64 {
    fn wrap(series: Arc<TimeSeries<Self>>) -> AnySeries {
        AnySeries::Int(series)
    }

    fn unwrap(any: &AnySeries) -> Option<&Arc<TimeSeries<Self>>> {
        match any {
            AnySeries::Int(s) => Some(s),
            AnySeries::Double(_) => None,
        }
    }

    fn unwrap_mut(any: &mut AnySeries) -> Option<&mut Arc<TimeSeries<Self>>> {
        match any {
            AnySeries::Int(s) => Some(s),
            AnySeries::Double(_) => None,
        }
    }
}

impl RegistrySample for f64 {
    fn wrap(series: Arc<TimeSeries<Self>>) -> AnySeries {
        AnySeries::Double(series)
    }

    fn unwrap(any: &AnySeries) -> Option<&Arc<TimeSeries<Self>>> {
        match any {
            AnySeries::Double(s) => Some(s),
            AnySeries::Int(_) => None,
        }
    }

    fn unwrap_mut(any: &mut AnySeries) -> Option<&mut Arc<TimeSeries<Self>>> {
        match any {
            AnySeries::Double(s) => Some(s),
            AnySeries::Int(_) => None,
        }
    }
}
