//! Serializable summary of a correlation run

use super::{Correlation, OffsetMismatch};
use crate::series::Sample;
use serde::Serialize;

/// Result values in their promoted scalar type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValues {
    Int(Vec<i64>),
    Double(Vec<f64>),
}

impl ReportValues {
    pub fn len(&self) -> usize {
        match self {
            ReportValues::Int(v) => v.len(),
            ReportValues::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `delay` widened to `f64`
    pub fn get_f64(&self, delay: usize) -> Option<f64> {
        match self {
            ReportValues::Int(v) => v.get(delay).map(|x| *x as f64),
            ReportValues::Double(v) => v.get(delay).copied(),
        }
    }
}

/// Correlation output scalars that can be reported
pub trait ReportSample: Sample {
    fn report_values(values: &[Self]) -> ReportValues;
}

impl ReportSample for i64 {
    fn report_values(values: &[Self]) -> ReportValues {
        ReportValues::Int(values.to_vec())
    }
}

impl ReportSample for f64 {
    fn report_values(values: &[Self]) -> ReportValues {
        ReportValues::Double(values.to_vec())
    }
}

/// Correlation summary for display and export
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationReport {
    /// Label of the short series
    pub short: String,
    /// Label of the long series
    pub long: String,
    /// Minutes per delay step
    pub resolution: u32,
    pub start_offset: u32,
    /// Delay with the largest value
    pub peak_delay: Option<usize>,
    pub peak_value: Option<f64>,
    pub peak_lag_minutes: Option<u64>,
    /// Set when the inputs' start offsets disagreed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_mismatch: Option<[u32; 2]>,
    /// Result values indexed by delay
    pub values: ReportValues,
}

impl CorrelationReport {
    pub fn new<R: ReportSample>(
        short: impl Into<String>,
        long: impl Into<String>,
        correlation: &Correlation<R>,
    ) -> Self {
        let peak = correlation.peak();
        Self {
            short: short.into(),
            long: long.into(),
            resolution: correlation.resolution(),
            start_offset: correlation.series().start_offset(),
            peak_delay: peak.map(|(delay, _)| delay),
            peak_value: peak.map(|(_, value)| value.to_f64()),
            peak_lag_minutes: peak.map(|(delay, _)| correlation.lag_minutes(delay)),
            offset_mismatch: correlation
                .offset_mismatch()
                .map(|OffsetMismatch { short, long }| [short, long]),
            values: R::report_values(correlation.values()),
        }
    }

    /// Minutes corresponding to a delay index
    pub fn lag_minutes(&self, delay: usize) -> u64 {
        delay as u64 * u64::from(self.resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::super::cross_correlate;
    use super::*;
    use crate::series::TimeSeries;

    #[test]
    fn test_report_serializes() {
        let short = TimeSeries::from_values("S", 5, 0, vec![1_i64, 2]);
        let long = TimeSeries::from_values("L", 5, 0, vec![1_i64, 2, 3]);
        let corr = cross_correlate(Some(&short), Some(&long)).unwrap();

        let report = CorrelationReport::new("S", "L", &corr);
        assert_eq!(report.values, ReportValues::Int(vec![8, 5]));
        assert_eq!(report.peak_delay, Some(0));
        assert_eq!(report.peak_lag_minutes, Some(0));
        assert_eq!(report.lag_minutes(1), 5);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"values\":[8,5]"));
        assert!(json.contains("\"peak_value\":8.0"));
        assert!(!json.contains("offset_mismatch"));
    }

    #[test]
    fn test_report_records_offset_mismatch() {
        let short = TimeSeries::from_values("S", 1, 15, vec![0.5_f64]);
        let long = TimeSeries::from_values("L", 1, 0, vec![2.0_f64, 4.0]);
        let corr = cross_correlate(Some(&short), Some(&long)).unwrap();

        let report = CorrelationReport::new("S", "L", &corr);
        assert_eq!(report.offset_mismatch, Some([15, 0]));
        assert_eq!(report.values.get_f64(0), Some(2.0));
        assert_eq!(report.values.get_f64(1), Some(1.0));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"offset_mismatch\":[15,0]"));
    }
}
