//! Column layouts of the supported instrument files

use super::{clock_stats, IngestError, IngestResult};
use crate::registry::ColumnSpec;

/// Header terminator shared by the NOAA text products
const DASH_ARTIFACT: &str = r"^#-{5,}\s*$";

/// How the data lines of a file map onto columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutFormat {
    /// One whitespace field per column, after a header whose last line
    /// matches the `artifact` regex
    Table { artifact: String },
    /// NTP WWV/H reference clock `wwv5` lines; each line feeds the two
    /// synmax columns of the station named in it
    ClockStats,
}

impl LayoutFormat {
    fn dashed() -> Self {
        LayoutFormat::Table {
            artifact: DASH_ARTIFACT.to_string(),
        }
    }
}

/// Column declarations for one instrument file format
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub name: &'static str,
    pub description: &'static str,
    pub format: LayoutFormat,
    pub columns: Vec<ColumnSpec>,
}

/// Date and time columns leading every layout
fn clock_columns(resolution: u32) -> Vec<ColumnSpec> {
    ["YR", "MO", "DA", "HHMM", "DAY", "SEC"]
        .into_iter()
        .map(|label| ColumnSpec::int(label, resolution))
        .collect()
}

fn doubles<'a>(resolution: u32, labels: &'a [&'a str]) -> impl Iterator<Item = ColumnSpec> + 'a {
    labels
        .iter()
        .map(move |label| ColumnSpec::double(*label, resolution))
}

impl ColumnLayout {
    /// ACE magnetometer, one-minute averages
    pub fn ace_mag() -> Self {
        let mut columns = clock_columns(1);
        columns.push(ColumnSpec::int("STATUS", 1));
        columns.extend(doubles(1, &["BX", "BY", "BZ", "BT", "LAT", "LONG"]));
        Self {
            name: "ace-mag",
            description: "ACE magnetometer, 1-minute",
            format: LayoutFormat::dashed(),
            columns,
        }
    }

    /// ACE solar wind electron proton alpha monitor, one-minute averages
    pub fn ace_swe() -> Self {
        let mut columns = clock_columns(1);
        columns.push(ColumnSpec::int("STATUS", 1));
        columns.extend(doubles(1, &["PROTON", "SPEED", "TEMP"]));
        Self {
            name: "ace-swe",
            description: "ACE solar wind, 1-minute",
            format: LayoutFormat::dashed(),
            columns,
        }
    }

    /// GOES magnetometer, one-minute averages
    pub fn goes_mag() -> Self {
        let mut columns = clock_columns(1);
        columns.extend(doubles(1, &["HP", "HE", "HN", "TOTAL"]));
        Self {
            name: "goes-mag",
            description: "GOES magnetometer, 1-minute",
            format: LayoutFormat::dashed(),
            columns,
        }
    }

    /// GOES particle flux, five-minute averages
    pub fn goes_part() -> Self {
        let mut columns = clock_columns(5);
        columns.extend(doubles(
            5,
            &["P1", "P5", "P10", "P30", "P50", "P100", "E08", "E20", "E40"],
        ));
        Self {
            name: "goes-part",
            description: "GOES particle flux, 5-minute",
            format: LayoutFormat::dashed(),
            columns,
        }
    }

    /// WWV/H reference clock statistics, five-minute cycle
    ///
    /// Only the gain-scaled synmax of each station is kept, as
    /// `vsynmax<MHz>` (WWV) and `hsynmax<MHz>` (WWVH).
    pub fn clk_stats() -> Self {
        Self {
            name: "clk-stats",
            description: "WWV/H clock statistics, 5-minute",
            format: LayoutFormat::ClockStats,
            columns: clock_stats::columns(),
        }
    }

    /// Every built-in layout
    pub fn all() -> Vec<Self> {
        vec![
            Self::ace_mag(),
            Self::ace_swe(),
            Self::goes_mag(),
            Self::goes_part(),
            Self::clk_stats(),
        ]
    }

    pub fn names() -> Vec<&'static str> {
        Self::all().iter().map(|l| l.name).collect()
    }

    /// Look up a built-in layout by name
    pub fn by_name(name: &str) -> IngestResult<Self> {
        Self::all()
            .into_iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| IngestError::UnknownLayout(name.to_string()))
    }

    /// Custom layout with the dashed header terminator
    pub fn custom(name: &'static str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name,
            description: "custom",
            format: LayoutFormat::dashed(),
            columns,
        }
    }

    /// Builder: read as a table whose header ends at `pattern`
    pub fn with_artifact(mut self, pattern: &str) -> Self {
        self.format = LayoutFormat::Table {
            artifact: pattern.to_string(),
        };
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SampleKind;

    #[test]
    fn test_ace_mag_columns() {
        let layout = ColumnLayout::ace_mag();
        let labels: Vec<_> = layout.labels().collect();
        assert_eq!(
            labels,
            ["YR", "MO", "DA", "HHMM", "DAY", "SEC", "STATUS", "BX", "BY", "BZ", "BT", "LAT", "LONG"]
        );
        assert_eq!(layout.columns[6].kind, SampleKind::Int);
        assert_eq!(layout.columns[7].kind, SampleKind::Double);
    }

    #[test]
    fn test_goes_part_is_five_minute() {
        let layout = ColumnLayout::goes_part();
        assert_eq!(layout.columns.len(), 15);
        assert!(layout.columns.iter().all(|c| c.resolution == 5));
    }

    #[test]
    fn test_clk_stats_columns() {
        let layout = ColumnLayout::clk_stats();
        assert_eq!(layout.format, LayoutFormat::ClockStats);
        assert_eq!(layout.columns.len(), 10);
        assert!(layout
            .columns
            .iter()
            .all(|c| c.kind == SampleKind::Int && c.resolution == 5));
        assert!(layout.labels().any(|l| l == "vsynmax10"));
        assert!(layout.labels().any(|l| l == "hsynmax20"));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(ColumnLayout::by_name("ace-swe").unwrap().columns.len(), 10);
        assert_eq!(ColumnLayout::by_name("GOES-MAG").unwrap().name, "goes-mag");
        assert_eq!(
            ColumnLayout::names(),
            ["ace-mag", "ace-swe", "goes-mag", "goes-part", "clk-stats"]
        );

        let err = ColumnLayout::by_name("xray").unwrap_err();
        assert!(matches!(err, IngestError::UnknownLayout(ref n) if n == "xray"));
        assert!(err.to_string().contains("ace-mag"));
    }
}
