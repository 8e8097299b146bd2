//! Cross-correlation engine
//!
//! Slides the short series across the long one and records the dot
//! product at every alignment. With `result_len = long_len - short_len + 1`,
//! delay `d` anchors the short window at `result_len - d - 1`:
//!
//! ```text
//! long:   [ 0 1 2 3 4 5 6 7 8 9 ]
//! d = 0:            [ s s s s s ]   window at the tail
//! d = 5:  [ s s s s s ]             window at the head
//! ```
//!
//! Each delay step is one resolution unit, so `lag_minutes(d)` is
//! `d * resolution`.

mod report;

pub use report::{CorrelationReport, ReportSample, ReportValues};

use crate::registry::AnySeries;
use crate::series::{Sample, SeriesError, SeriesResult, TimeSeries};

/// Label given to every correlation result series
pub const RESULT_LABEL: &str = "RESULT";

/// Arithmetic promotion of a short-series scalar against a long-series scalar
///
/// Integer pairs widen to `i64`; any floating operand promotes to `f64`.
pub trait Promote<L: Sample>: Sample {
    type Promoted: Sample;

    fn lift_short(self) -> Self::Promoted;
    fn lift_long(value: L) -> Self::Promoted;
}

macro_rules! promote {
    ($out:ty; $($short:ty, $long:ty);* $(;)?) => {
        $(
            impl Promote<$long> for $short {
                type Promoted = $out;

                fn lift_short(self) -> $out {
                    self as $out
                }

                fn lift_long(value: $long) -> $out {
                    value as $out
                }
            }
        )*
    };
}

promote!(i64;
    i32, i32; i32, i64; i64, i32; i64, i64;
);
promote!(f64;
    f32, f32; f32, f64; f64, f32; f64, f64;
    i32, f32; i32, f64; i64, f32; i64, f64;
    f32, i32; f32, i64; f64, i32; f64, i64;
);

/// Start offsets of two correlated series that did not agree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetMismatch {
    pub short: u32,
    pub long: u32,
}

/// Result of a cross-correlation
#[derive(Debug, Clone)]
pub struct Correlation<R> {
    series: TimeSeries<R>,
    offset_mismatch: Option<OffsetMismatch>,
}

impl<R: Sample> Correlation<R> {
    /// The result series, labelled `RESULT`
    pub fn series(&self) -> &TimeSeries<R> {
        &self.series
    }

    pub fn into_series(self) -> TimeSeries<R> {
        self.series
    }

    /// Result values indexed by delay
    pub fn values(&self) -> &[R] {
        self.series.values().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn resolution(&self) -> u32 {
        self.series.resolution()
    }

    /// Set when the inputs' start offsets differed; the result was still computed
    pub fn offset_mismatch(&self) -> Option<OffsetMismatch> {
        self.offset_mismatch
    }

    /// Delay expressed in minutes
    pub fn lag_minutes(&self, delay: usize) -> u64 {
        delay as u64 * u64::from(self.series.resolution())
    }

    /// Delay and value of the largest result; earliest delay wins ties
    pub fn peak(&self) -> Option<(usize, R)> {
        let mut best: Option<(usize, R)> = None;
        for (delay, &value) in self.values().iter().enumerate() {
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((delay, value)),
            }
        }
        best
    }
}

/// Cross-correlate two final series
///
/// Fails on a missing or unfinished operand, on differing resolutions,
/// when `short` has more values than `long`, and when an integer sum does
/// not fit in `i64`. Differing start offsets are
/// logged and recorded on the result but do not stop the computation.
pub fn cross_correlate<S, L>(
    short: Option<&TimeSeries<S>>,
    long: Option<&TimeSeries<L>>,
) -> SeriesResult<Correlation<S::Promoted>>
where
    S: Promote<L>,
    L: Sample,
{
    let short = short.ok_or(SeriesError::NullSeries("short"))?;
    let long = long.ok_or(SeriesError::NullSeries("long"))?;
    let short_values = short.values().ok_or(SeriesError::NullSeries("short"))?;
    let long_values = long.values().ok_or(SeriesError::NullSeries("long"))?;

    tracing::debug!(
        short = short.label(),
        long = long.label(),
        short_len = short_values.len(),
        long_len = long_values.len(),
        "correlating"
    );

    if short.resolution() != long.resolution() {
        return Err(SeriesError::ResolutionMismatch {
            short: short.resolution(),
            long: long.resolution(),
        });
    }

    let offset_mismatch = if short.start_offset() != long.start_offset() {
        tracing::warn!(
            short = short.label(),
            long = long.label(),
            short_start = short.start_offset(),
            long_start = long.start_offset(),
            "correlating series with mismatched start offsets"
        );
        Some(OffsetMismatch {
            short: short.start_offset(),
            long: long.start_offset(),
        })
    } else {
        None
    };

    if short_values.len() > long_values.len() {
        return Err(SeriesError::ShortSeriesTooLong {
            short: short_values.len(),
            long: long_values.len(),
        });
    }

    let result_len = long_values.len() - short_values.len() + 1;
    let zero = <S::Promoted as Sample>::zero();
    let mut result: Vec<S::Promoted> = Vec::with_capacity(result_len);

    for delay in 0..result_len {
        let anchor = result_len - delay - 1;
        let window = &long_values[anchor..anchor + short_values.len()];
        let overflow = || {
            tracing::warn!(short = short.label(), long = long.label(), delay, "correlation overflowed");
            SeriesError::Overflow { delay }
        };

        let mut positive = zero;
        let mut negative = zero;
        for (&s, &l) in short_values.iter().zip(window) {
            let term = s.lift_short().try_mul(S::lift_long(l)).ok_or_else(overflow)?;
            if term > zero {
                positive = positive.try_add(term).ok_or_else(overflow)?;
            } else {
                negative = negative.try_add(term).ok_or_else(overflow)?;
            }
        }
        result.push(positive.try_add(negative).ok_or_else(overflow)?);
    }

    Ok(Correlation {
        series: TimeSeries::from_values(
            RESULT_LABEL,
            short.resolution(),
            short.start_offset(),
            result,
        ),
        offset_mismatch,
    })
}

/// Cross-correlate two registry series of runtime-known type
pub fn cross_correlate_any(
    short: Option<&AnySeries>,
    long: Option<&AnySeries>,
) -> SeriesResult<CorrelationReport> {
    let short = short.ok_or(SeriesError::NullSeries("short"))?;
    let long = long.ok_or(SeriesError::NullSeries("long"))?;

    let report = match (short, long) {
        (AnySeries::Int(s), AnySeries::Int(l)) => {
            CorrelationReport::new(short.label(), long.label(), &cross_correlate(Some(&**s), Some(&**l))?)
        }
        (AnySeries::Int(s), AnySeries::Double(l)) => {
            CorrelationReport::new(short.label(), long.label(), &cross_correlate(Some(&**s), Some(&**l))?)
        }
        (AnySeries::Double(s), AnySeries::Int(l)) => {
            CorrelationReport::new(short.label(), long.label(), &cross_correlate(Some(&**s), Some(&**l))?)
        }
        (AnySeries::Double(s), AnySeries::Double(l)) => {
            CorrelationReport::new(short.label(), long.label(), &cross_correlate(Some(&**s), Some(&**l))?)
        }
    };
    Ok(report)
}
