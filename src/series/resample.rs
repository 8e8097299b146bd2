//! Resampling
//!
//! Derives a new, already final series from a final source at a coarser
//! cadence. Three cases, checked in order:
//!
//! 1. Minute-cadence source: take every `resolution`-th value.
//! 2. Target resolution a larger multiple of the source's: take every
//!    `resolution / source.resolution`-th value.
//! 3. Anything else: copy the source unchanged, keeping its own
//!    resolution and start offset.
//!
//! In the strided cases the start offset is an index into the source
//! values, so output `i` is `source[i * step + start]`.

use crate::series::error::{SeriesError, SeriesResult};
use crate::series::time_series::TimeSeries;
use crate::series::types::Sample;

/// Which mapping a resample request falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleMode {
    /// Source sampled once per minute
    MinuteCadence { step: u32 },
    /// Target is a whole multiple of the source cadence
    Multiple { step: u32 },
    /// Equal or incompatible cadence; values are copied as-is
    Passthrough,
}

impl ResampleMode {
    /// Classify a request from `source_resolution` to `resolution`
    pub fn classify(source_resolution: u32, resolution: u32) -> Self {
        if source_resolution == 1 {
            ResampleMode::MinuteCadence { step: resolution }
        } else if resolution > source_resolution && resolution % source_resolution == 0 {
            ResampleMode::Multiple {
                step: resolution / source_resolution,
            }
        } else {
            ResampleMode::Passthrough
        }
    }
}

/// Resample `source`, keeping its label
pub fn resample<T: Sample>(
    source: &TimeSeries<T>,
    resolution: u32,
    start_offset: u32,
) -> SeriesResult<TimeSeries<T>> {
    resample_labeled(source, resolution, start_offset, source.label().to_string())
}

/// Resample `source` into a new series named `label`
pub fn resample_labeled<T: Sample>(
    source: &TimeSeries<T>,
    resolution: u32,
    start_offset: u32,
    label: impl Into<String>,
) -> SeriesResult<TimeSeries<T>> {
    let values = source.values().ok_or(SeriesError::NullSeries("source"))?;
    let invalid = || SeriesError::InvalidResampleParameters {
        resolution,
        start_offset,
        source_len: values.len(),
    };

    if resolution == 0 {
        return Err(invalid());
    }

    let mode = ResampleMode::classify(source.resolution(), resolution);
    tracing::debug!(
        label = source.label(),
        from = source.resolution(),
        to = resolution,
        start_offset,
        ?mode,
        "resampling"
    );

    match mode {
        ResampleMode::MinuteCadence { step } | ResampleMode::Multiple { step } => {
            let sampled = strided(values, step as usize, start_offset as usize);
            if sampled.is_empty() {
                return Err(invalid());
            }
            Ok(TimeSeries::from_values(label, resolution, start_offset, sampled))
        }
        ResampleMode::Passthrough => {
            if values.is_empty() {
                return Err(invalid());
            }
            Ok(TimeSeries::from_values(
                label,
                source.resolution(),
                source.start_offset(),
                values.to_vec(),
            ))
        }
    }
}

/// `values[i * step + start]` for `i` in `0..len / step`, stopping early
/// rather than reading past the end
fn strided<T: Sample>(values: &[T], step: usize, start: usize) -> Vec<T> {
    let len = values.len() / step;
    values
        .iter()
        .skip(start)
        .step_by(step)
        .take(len)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minute_series(len: i64) -> TimeSeries<i64> {
        TimeSeries::from_values("MIN", 1, 0, (0..len).collect())
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            ResampleMode::classify(1, 5),
            ResampleMode::MinuteCadence { step: 5 }
        );
        assert_eq!(
            ResampleMode::classify(5, 15),
            ResampleMode::Multiple { step: 3 }
        );
        assert_eq!(ResampleMode::classify(5, 5), ResampleMode::Passthrough);
        assert_eq!(ResampleMode::classify(5, 7), ResampleMode::Passthrough);
        assert_eq!(ResampleMode::classify(10, 5), ResampleMode::Passthrough);
    }

    #[test]
    fn test_minute_source() {
        let source = minute_series(5000);
        let out = resample(&source, 5, 0).unwrap();

        assert_eq!(out.len(), 1000);
        assert_eq!(out.resolution(), 5);
        assert!(out.is_final());
        let src = source.values().unwrap();
        for (i, v) in out.values().unwrap().iter().enumerate() {
            assert_eq!(*v, src[i * 5]);
        }
    }

    #[test]
    fn test_multiple_source() {
        let source = TimeSeries::from_values("FIVE", 5, 0, (0..1000_i64).collect());
        let out = resample(&source, 10, 0).unwrap();

        assert_eq!(out.len(), 500);
        assert_eq!(out.resolution(), 10);
        let src = source.values().unwrap();
        for (i, v) in out.values().unwrap().iter().enumerate() {
            assert_eq!(*v, src[i * 2]);
        }
    }

    #[test]
    fn test_resampling_composes() {
        let source = minute_series(5000);
        let five = resample(&source, 5, 0).unwrap();

        let via_five = resample(&five, 50, 0).unwrap();
        let direct = resample(&source, 50, 0).unwrap();
        assert_eq!(via_five.values(), direct.values());
        assert_eq!(via_five.len(), 100);

        let ten_via_five = resample(&five, 10, 0).unwrap();
        let ten_direct = resample(&source, 10, 0).unwrap();
        assert_eq!(ten_via_five.values(), ten_direct.values());
    }

    #[test]
    fn test_start_offset_shifts_samples() {
        let source = minute_series(100);
        let out = resample(&source, 10, 3).unwrap();

        assert_eq!(out.start_offset(), 3);
        assert_eq!(out.values().unwrap()[0], 3);
        assert_eq!(out.values().unwrap()[1], 13);
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn test_start_offset_never_reads_past_end() {
        let source = minute_series(20);
        let out = resample(&source, 10, 15).unwrap();
        assert_eq!(out.values(), Some(&[15][..]));
    }

    #[test]
    fn test_passthrough_copies_source() {
        let source = TimeSeries::from_values("FIVE", 5, 20, vec![1.0, 2.0, 3.0]);

        let same = resample(&source, 5, 0).unwrap();
        assert_eq!(same.resolution(), 5);
        assert_eq!(same.start_offset(), 20);
        assert_eq!(same.values(), source.values());

        let odd = resample(&source, 7, 0).unwrap();
        assert_eq!(odd.resolution(), 5);
        assert_eq!(odd.values(), source.values());
    }

    #[test]
    fn test_empty_output_is_rejected() {
        let source = minute_series(4);
        assert!(matches!(
            resample(&source, 5, 0),
            Err(SeriesError::InvalidResampleParameters { .. })
        ));
        assert!(matches!(
            resample(&source, 0, 0),
            Err(SeriesError::InvalidResampleParameters { .. })
        ));
        assert!(matches!(
            resample(&source, 2, 10),
            Err(SeriesError::InvalidResampleParameters { .. })
        ));
        assert_eq!(source.len(), 4);
    }

    #[test]
    fn test_unfinished_source_is_rejected() {
        let mut open: TimeSeries<i64> = TimeSeries::new("OPEN");
        open.push(1).unwrap();
        assert!(matches!(
            resample(&open, 5, 0),
            Err(SeriesError::NullSeries("source"))
        ));
    }

    #[test]
    fn test_derive_at_uses_label_and_defaults() {
        let source = minute_series(60);
        let derived = source.derive_at(Some(15), None, "MIN15").unwrap();
        assert_eq!(derived.label(), "MIN15");
        assert_eq!(derived.start_offset(), 0);
        assert_eq!(derived.values(), Some(&[0, 15, 30, 45][..]));

        let defaults = source.derive_at(None, None, "COPY").unwrap();
        assert_eq!(defaults.resolution(), 1);
        assert_eq!(defaults.values(), source.values());
    }
}
