//! Decoder for whitespace-separated instrument files and clock statistics

use super::{clock_stats, ColumnLayout, IngestError, IngestResult, LayoutFormat};
use crate::config::Config;
use crate::registry::{RowValue, SeriesRegistry};
use crate::series::SampleKind;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// Outcome of decoding one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub layout: String,
    pub rows_processed: usize,
    pub rows_failed: usize,
    /// Zero values appended per column to complete the day
    pub padded: usize,
    /// Per-line failures, `line N: reason`
    pub errors: Vec<String>,
    /// Columns left unfinalized, `LABEL: reason`
    pub unfinalized: Vec<String>,
}

impl IngestReport {
    fn record(&mut self, idx: usize, outcome: IngestResult<()>) {
        match outcome {
            Ok(()) => self.rows_processed += 1,
            Err(e) => {
                tracing::debug!(line = idx + 1, error = %e, "skipping line");
                self.rows_failed += 1;
                self.errors.push(format!("line {}: {}", idx + 1, e));
            }
        }
    }
}

/// A finalized registry and how it was built
#[derive(Debug)]
pub struct Decoded {
    pub registry: SeriesRegistry,
    pub report: IngestReport,
}

/// Decoder for instrument text files
#[derive(Debug, Clone)]
pub struct TextDecoder {
    sentinels: Vec<f64>,
    replacement: f64,
    pad_to_day: bool,
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TextDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            sentinels: config.ingest.sentinels.clone(),
            replacement: config.ingest.replacement,
            pad_to_day: config.analysis.pad_to_day,
        }
    }

    /// Builder: set the "no data" readings
    pub fn with_sentinels(mut self, sentinels: Vec<f64>) -> Self {
        self.sentinels = sentinels;
        self
    }

    /// Builder: set the value stored in place of a sentinel
    pub fn with_replacement(mut self, replacement: f64) -> Self {
        self.replacement = replacement;
        self
    }

    /// Builder: pad each column to a full day before finalizing
    pub fn with_pad_to_day(mut self, pad_to_day: bool) -> Self {
        self.pad_to_day = pad_to_day;
        self
    }

    /// Decode a file with a built-in layout chosen by name
    pub fn decode_named(&self, layout: &str, path: &Path) -> IngestResult<Decoded> {
        let layout = ColumnLayout::by_name(layout)?;
        self.decode_file(&layout, path)
    }

    /// Decode a file from disk
    pub fn decode_file(&self, layout: &ColumnLayout, path: &Path) -> IngestResult<Decoded> {
        tracing::debug!(path = %path.display(), layout = layout.name, "decoding file");
        let text = std::fs::read_to_string(path)?;
        self.decode_str(layout, &text)
    }

    /// Decode file contents already in memory
    ///
    /// For table layouts, lines up to and including the header artifact
    /// are skipped. After it, blank lines and lines starting with `#` or
    /// `:` are ignored. Clock statistics only read `wwv5` lines. A line
    /// that fails to parse is counted and reported but does not stop
    /// decoding.
    pub fn decode_str(&self, layout: &ColumnLayout, text: &str) -> IngestResult<Decoded> {
        let mut registry = SeriesRegistry::new(layout.columns.clone());
        let mut report = IngestReport {
            layout: layout.name.to_string(),
            ..Default::default()
        };

        match &layout.format {
            LayoutFormat::Table { artifact } => {
                self.decode_table(layout, artifact, text, &mut registry, &mut report)?
            }
            LayoutFormat::ClockStats => decode_clock_stats(text, &mut registry, &mut report),
        }

        let summary = registry.finalize_all(self.pad_to_day);
        report.padded = summary.padded;
        report.unfinalized = summary
            .failed
            .iter()
            .map(|(label, e)| format!("{}: {}", label, e))
            .collect();

        tracing::info!(
            layout = layout.name,
            rows = report.rows_processed,
            failed = report.rows_failed,
            padded = report.padded,
            "decoded"
        );
        Ok(Decoded { registry, report })
    }

    fn decode_table(
        &self,
        layout: &ColumnLayout,
        artifact: &str,
        text: &str,
        registry: &mut SeriesRegistry,
        report: &mut IngestReport,
    ) -> IngestResult<()> {
        let pattern = Regex::new(artifact)
            .map_err(|e| IngestError::Parse(format!("invalid header pattern: {}", e)))?;

        let mut lines = text.lines().enumerate();
        if !lines.by_ref().any(|(_, line)| pattern.is_match(line.trim_end())) {
            tracing::warn!(layout = layout.name, "header artifact not found");
            return Err(IngestError::MissingArtifact {
                layout: layout.name.to_string(),
                artifact: artifact.to_string(),
            });
        }

        for (idx, line) in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(':') {
                continue;
            }

            let accepted = self
                .parse_row(layout, line)
                .and_then(|row| registry.accept_row(&row).map_err(IngestError::from));
            report.record(idx, accepted);
        }
        Ok(())
    }

    fn parse_row(&self, layout: &ColumnLayout, line: &str) -> IngestResult<Vec<RowValue>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != layout.columns.len() {
            return Err(IngestError::Parse(format!(
                "expected {} fields, found {}",
                layout.columns.len(),
                tokens.len()
            )));
        }

        layout
            .columns
            .iter()
            .zip(tokens)
            .map(|(col, token)| match col.kind {
                SampleKind::Int => token.parse::<i64>().map(RowValue::Int).map_err(|e| {
                    IngestError::Parse(format!("{} '{}': {}", col.label, token, e))
                }),
                SampleKind::Double => token
                    .parse::<f64>()
                    .map(|v| RowValue::Double(self.clean(v)))
                    .map_err(|e| IngestError::Parse(format!("{} '{}': {}", col.label, token, e))),
                SampleKind::Ignore => Ok(RowValue::Skip),
            })
            .collect()
    }

    /// Replace sentinel and NaN readings
    fn clean(&self, value: f64) -> f64 {
        let is_sentinel = self
            .sentinels
            .iter()
            .any(|s| (value - s).abs() <= f64::EPSILON * s.abs().max(1.0));
        if is_sentinel || value.is_nan() {
            self.replacement
        } else {
            value
        }
    }
}

/// Feed each `wwv5` line into the synmax columns of its station
fn decode_clock_stats(text: &str, registry: &mut SeriesRegistry, report: &mut IngestReport) {
    for (idx, line) in text.lines().enumerate() {
        if !line.contains(clock_stats::IDENT) {
            continue;
        }

        let accepted = clock_stats::parse_line(line).and_then(|parsed| {
            let (v, h) = parsed.labels();
            registry.accept(&v, parsed.vsynmax)?;
            registry.accept(&h, parsed.hsynmax)?;
            Ok(())
        });
        report.record(idx, accepted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ColumnSpec;
    use std::io::Write;

    const ACE_MAG: &str = "\
:Data_list: 20100716_ace_mag_1m.txt
:Created: 2010 Jul 17 0010 UT
#                Modified Seconds
# UT Date   Time  Julian  of the   ----------------  GSM Coordinates ---------------
# YR MO DA  HHMM    Day      Day       S     Bx      By      Bz      Bt     Lat.   Long.
#------------------------------------------------------------------------------------
2010 07 16  0000   55393       0       0    -2.3     1.6    -4.1     4.9   -56.3   145.6
2010 07 16  0001   55393      60       0  -999.9  -999.9  -999.9  -999.9  -999.9  -999.9
2010 07 16  0002   55393     120       0    -2.1     1.2    -3.9     4.6   -58.0   150.3
";

    fn ace(decoder: &TextDecoder) -> Decoded {
        decoder.decode_str(&ColumnLayout::ace_mag(), ACE_MAG).unwrap()
    }

    impl TextDecoder {
        fn decode_named_str(&self, layout: &str, text: &str) -> Decoded {
            self.decode_str(&ColumnLayout::by_name(layout).unwrap(), text).unwrap()
        }
    }

    #[test]
    fn test_decode_ace_mag() {
        let decoded = ace(&TextDecoder::new().with_pad_to_day(false));
        assert_eq!(decoded.report.rows_processed, 3);
        assert_eq!(decoded.report.rows_failed, 0);
        assert_eq!(decoded.report.padded, 0);

        let bx = decoded.registry.get_series::<f64>("BX", None, None).unwrap();
        assert_eq!(bx.values().unwrap(), &[-2.3, 0.0, -2.1]);

        let sec = decoded.registry.get_series::<i64>("SEC", None, None).unwrap();
        assert_eq!(sec.values().unwrap(), &[0, 60, 120]);
        assert_eq!(sec.resolution(), 1);
    }

    #[test]
    fn test_pad_to_full_day() {
        let decoded = ace(&TextDecoder::new());
        let columns = ColumnLayout::ace_mag().columns.len();
        assert_eq!(decoded.report.padded, columns * (1440 - 3));

        let bt = decoded.registry.get_series::<f64>("BT", None, None).unwrap();
        assert_eq!(bt.len(), 1440);
        assert_eq!(bt.values().unwrap()[1439], 0.0);

        let five = decoded.registry.get_series::<f64>("BT", Some(5), None).unwrap();
        assert_eq!(five.len(), 288);
        assert_eq!(five.values().unwrap()[0], 4.9);
    }

    #[test]
    fn test_custom_sentinels() {
        let decoder = TextDecoder::new()
            .with_pad_to_day(false)
            .with_sentinels(vec![-56.3])
            .with_replacement(-1.0);
        let decoded = ace(&decoder);

        let lat = decoded.registry.get_series::<f64>("LAT", None, None).unwrap();
        assert_eq!(lat.values().unwrap(), &[-1.0, -999.9, -58.0]);
    }

    #[test]
    fn test_bad_lines_are_counted() {
        let text = format!(
            "{}2010 07 16  0003   55393     180\n2010 07 16  0004   55393     240       0    x.x     1.0     1.0     1.0     1.0     1.0\n\n# trailer\n",
            ACE_MAG
        );
        let decoded = TextDecoder::new()
            .with_pad_to_day(false)
            .decode_str(&ColumnLayout::ace_mag(), &text)
            .unwrap();

        assert_eq!(decoded.report.rows_processed, 3);
        assert_eq!(decoded.report.rows_failed, 2);
        assert!(decoded.report.errors[0].starts_with("line 10:"));
        assert!(decoded.report.errors[1].contains("BX 'x.x'"));
        assert_eq!(decoded.registry.stored("BX").unwrap().len(), 3);
    }

    #[test]
    fn test_missing_artifact() {
        let result = TextDecoder::new().decode_str(&ColumnLayout::goes_mag(), "2010 07 16 0000\n");
        assert!(matches!(
            result,
            Err(IngestError::MissingArtifact { ref layout, .. }) if layout == "goes-mag"
        ));
    }

    #[test]
    fn test_no_rows_without_padding() {
        let decoded = TextDecoder::new()
            .with_pad_to_day(false)
            .decode_str(&ColumnLayout::goes_mag(), "#-----\n")
            .unwrap();
        assert_eq!(decoded.report.rows_processed, 0);
        assert_eq!(decoded.report.unfinalized.len(), 10);
        assert!(decoded.registry.get_series::<f64>("HP", None, None).is_none());
    }

    #[test]
    fn test_decode_goes_part_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ":Data_list: 20100716_Gp_part_5m.txt").unwrap();
        writeln!(file, "#-----------------------------------").unwrap();
        writeln!(
            file,
            "2010 07 16  0000   55393      0   3.2e+00 1.1e+00 -1.00e+05 2.0e-01 1.0e-01 5.0e-02 1.2e+04 3.4e+02 5.6e+01"
        )
        .unwrap();
        writeln!(
            file,
            "2010 07 16  0005   55393    300   3.0e+00 1.0e+00 4.00e-01 2.0e-01 1.0e-01 5.0e-02 1.1e+04 3.3e+02 5.5e+01"
        )
        .unwrap();

        let decoded = TextDecoder::new().decode_named("goes-part", file.path()).unwrap();
        assert_eq!(decoded.report.rows_processed, 2);

        let p10 = decoded.registry.get_series::<f64>("P10", None, None).unwrap();
        assert_eq!(p10.resolution(), 5);
        assert_eq!(p10.len(), 288);
        assert_eq!(&p10.values().unwrap()[..2], &[0.0, 0.4]);
    }

    #[test]
    fn test_custom_layout_with_ignored_column() {
        let layout = ColumnLayout::custom(
            "clock",
            vec![
                ColumnSpec::ignore("PID"),
                ColumnSpec::int("OFFSET", 1),
                ColumnSpec::double("DRIFT", 1),
            ],
        )
        .with_artifact(r"^=+$");
        let text = "header\n=====\n7 12 0.5\n7 -3 0.25\n";

        let decoded = TextDecoder::new()
            .with_pad_to_day(false)
            .decode_str(&layout, text)
            .unwrap();
        assert!(decoded.registry.stored("PID").is_none());
        let offset = decoded.registry.get_series::<i64>("OFFSET", None, None).unwrap();
        assert_eq!(offset.values().unwrap(), &[12, -3]);
    }

    const CLK_STATS: &str = "\
55393 0.512 127.127.36.0 wwv5 0c43 10 5998 3012 18.4 2214 16.1 WV2 ffff 100 40 21.3 479880 5997 WH2 00ff 60 7 8.2 479881 5990 12
55393 60.512 127.127.36.0 refclock driver restarted
55393 60.877 127.127.36.0 wwv5 0c43 20 5998 3012 18.4 2214 16.1 WV5 ffff 100 55 21.3 479880 5997 WH5 00ff 60 9 8.2 479881 5990 12
55393 120.233 127.127.36.0 wwv5 0c43 3 5998 3012 18.4 2214 16.1 WV9 ffff 100 55 21.3 479880 5997 WH9 00ff 60 9 8.2 479881 5990 12
55393 300.480 127.127.36.0 wwv5 0c43 10 5998 3012 18.4 2214 16.1 WV2/ffff 100 41 21.3 479880 5997 WH2/00ff 60 8 8.2 479881 5990 12
";

    #[test]
    fn test_decode_clock_stats_scales_by_gain() {
        let decoded = TextDecoder::new()
            .with_pad_to_day(false)
            .decode_named_str("clk-stats", CLK_STATS);
        assert_eq!(decoded.report.rows_processed, 3);
        assert_eq!(decoded.report.rows_failed, 1);
        assert!(decoded.report.errors[0].starts_with("line 4:"));

        let v2 = decoded.registry.get_series::<i64>("vsynmax2", None, None).unwrap();
        assert_eq!(v2.values().unwrap(), &[400, 410]);
        assert_eq!(v2.resolution(), 5);
        let h2 = decoded.registry.get_series::<i64>("hsynmax2", None, None).unwrap();
        assert_eq!(h2.values().unwrap(), &[70, 80]);

        let v5 = decoded.registry.get_series::<i64>("vsynmax5", None, None).unwrap();
        assert_eq!(v5.values().unwrap(), &[1100]);
        assert_eq!(
            decoded.registry.get_series::<i64>("hsynmax5", None, None).unwrap().values().unwrap(),
            &[180]
        );

        // stations that never reported stay unfinalized
        assert!(decoded.registry.get_series::<i64>("vsynmax20", None, None).is_none());
        assert_eq!(decoded.report.unfinalized.len(), 6);
    }

    #[test]
    fn test_clock_stats_pad_to_full_day() {
        let decoded = TextDecoder::new().decode_named_str("clk-stats", CLK_STATS);
        assert!(decoded.report.unfinalized.is_empty());

        let h5 = decoded.registry.get_series::<i64>("hsynmax5", None, None).unwrap();
        assert_eq!(h5.len(), 288);
        assert_eq!(h5.values().unwrap()[0], 180);
        assert_eq!(h5.values().unwrap()[287], 0);
        assert_eq!(
            decoded.registry.get_series::<i64>("vsynmax15", None, None).unwrap().len(),
            288
        );
    }

    #[test]
    fn test_missing_file() {
        let result = TextDecoder::new().decode_named("ace-mag", Path::new("/nonexistent/ace.txt"));
        assert!(matches!(result, Err(IngestError::Io(_))));
    }
}
