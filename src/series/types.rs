//! Core types shared by the series layer
//!
//! - `Sample`: the numeric scalar a series stores (signed integer or float)
//! - `SampleKind`: runtime tag for a column's declared scalar type
//! - `SeriesState`: the Idle → Collecting → Final lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul};

/// Minutes per sample assumed until a series is told otherwise
pub const DEFAULT_RESOLUTION: u32 = 1;

/// Minutes after 00:00 UTC assumed until a series is told otherwise
pub const DEFAULT_START_OFFSET: u32 = 0;

/// Number of one-minute samples in a UTC day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Declared scalar type of a data column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// Column is present in the source but not stored
    Ignore,
    /// Signed integer samples
    Int,
    /// Floating point samples
    Double,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKind::Ignore => write!(f, "ignore"),
            SampleKind::Int => write!(f, "int"),
            SampleKind::Double => write!(f, "double"),
        }
    }
}

/// A numeric scalar that can be stored in a `TimeSeries`
pub trait Sample:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + Send
    + Sync
    + 'static
{
    /// Runtime tag for this scalar type
    const KIND: SampleKind;

    /// Additive identity, also the padding value for short days
    fn zero() -> Self {
        Self::default()
    }

    /// True for values that carry no reading (NaN for floats)
    fn is_missing(&self) -> bool {
        false
    }

    /// Lossy widening used for reports
    fn to_f64(self) -> f64;

    /// Sum, or `None` on integer overflow
    fn try_add(self, rhs: Self) -> Option<Self>;

    /// Product, or `None` on integer overflow
    fn try_mul(self, rhs: Self) -> Option<Self>;
}

macro_rules! int_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                const KIND: SampleKind = SampleKind::Int;

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn try_add(self, rhs: Self) -> Option<Self> {
                    self.checked_add(rhs)
                }

                fn try_mul(self, rhs: Self) -> Option<Self> {
                    self.checked_mul(rhs)
                }
            }
        )*
    };
}

macro_rules! float_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                const KIND: SampleKind = SampleKind::Double;

                fn is_missing(&self) -> bool {
                    self.is_nan()
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn try_add(self, rhs: Self) -> Option<Self> {
                    Some(self + rhs)
                }

                fn try_mul(self, rhs: Self) -> Option<Self> {
                    Some(self * rhs)
                }
            }
        )*
    };
}

int_sample!(i32, i64);
float_sample!(f32, f64);

/// Lifecycle of a series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeriesState {
    /// Created, nothing accepted yet
    Idle,
    /// At least one value accepted; still growing
    Collecting,
    /// Frozen into a contiguous array; terminal
    Final,
}

impl fmt::Display for SeriesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesState::Idle => write!(f, "idle"),
            SeriesState::Collecting => write!(f, "collecting"),
            SeriesState::Final => write!(f, "final"),
        }
    }
}
