//! crosscorr CLI
//!
//! Command-line interface for decoding instrument files and
//! cross-correlating their series:
//! - Inspect the columns decoded from a file
//! - Correlate two series at a common resolution
//! - List the built-in layouts
//! - Generate a default config file

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use crosscorr::config::{generate_default_config, Config, LoggingConfig};
use crosscorr::correlate::{cross_correlate_any, CorrelationReport, ReportValues};
use crosscorr::ingest::{ColumnLayout, Decoded, TextDecoder};
use crosscorr::registry::AnySeries;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "crosscorr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Time-lag cross-correlation of space-weather telemetry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/crosscorr/config.toml or ./crosscorr.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a file and list its series
    Inspect {
        /// Path to the instrument file
        path: PathBuf,
        /// Layout name (see `layouts`)
        #[arg(short, long)]
        layout: String,
    },

    /// Cross-correlate two series
    Correlate {
        /// Short series as <file>:<label>
        #[arg(long)]
        short: String,
        /// Long series as <file>:<label>
        #[arg(long)]
        long: String,
        /// Layout of the short series' file
        #[arg(long)]
        layout_short: String,
        /// Layout of the long series' file (default: same as short)
        #[arg(long)]
        layout_long: Option<String>,
        /// Resolution in minutes (default: from config)
        #[arg(short, long)]
        resolution: Option<u32>,
        /// Start offset in minutes (default: from config)
        #[arg(short, long)]
        start: Option<u32>,
    },

    /// List built-in layouts
    Layouts,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Inspect { path, layout } => {
            let decoded = decode(&config, &layout, &path)?;
            print_inspect(&decoded, cli.format)?;
        }

        Commands::Correlate {
            short,
            long,
            layout_short,
            layout_long,
            resolution,
            start,
        } => {
            let resolution = resolution.unwrap_or(config.analysis.default_resolution);
            let start = start.unwrap_or(config.analysis.default_start_offset);
            let layout_long = layout_long.unwrap_or_else(|| layout_short.clone());

            let (short_path, short_label) = split_series_arg(&short)?;
            let (long_path, long_label) = split_series_arg(&long)?;

            let short_decoded = decode(&config, &layout_short, short_path)?;
            let long_decoded = decode(&config, &layout_long, long_path)?;

            let short_series = fetch(&short_decoded, short_label, resolution, start)?;
            let long_series = fetch(&long_decoded, long_label, resolution, start)?;

            let report = cross_correlate_any(Some(&short_series), Some(&long_series))
                .with_context(|| format!("correlating {} against {}", short_label, long_label))?;
            print_correlation(&report, cli.format)?;
        }

        Commands::Layouts => {
            for layout in ColumnLayout::all() {
                let labels: Vec<_> = layout.labels().collect();
                println!("{:<10} {:<30} {}", layout.name, layout.description, labels.join(" "));
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays machine readable
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crosscorr={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn decode(config: &Config, layout: &str, path: &Path) -> anyhow::Result<Decoded> {
    let decoded = TextDecoder::from_config(config)
        .decode_named(layout, path)
        .with_context(|| format!("decoding {:?} as {}", path, layout))?;

    if decoded.report.rows_failed > 0 {
        tracing::warn!(
            path = %path.display(),
            failed = decoded.report.rows_failed,
            "some lines could not be decoded"
        );
        for error in decoded.report.errors.iter().take(10) {
            tracing::warn!("{}", error);
        }
    }
    Ok(decoded)
}

/// Split `<file>:<label>` at the last colon
fn split_series_arg(arg: &str) -> anyhow::Result<(&Path, &str)> {
    match arg.rsplit_once(':') {
        Some((path, label)) if !path.is_empty() && !label.is_empty() => Ok((Path::new(path), label)),
        _ => bail!("expected <file>:<label>, got '{}'", arg),
    }
}

fn fetch(decoded: &Decoded, label: &str, resolution: u32, start: u32) -> anyhow::Result<AnySeries> {
    decoded
        .registry
        .get_any(label, Some(resolution), Some(start))
        .ok_or_else(|| {
            anyhow!(
                "series '{}' is not available from {} at {} min / +{} min",
                label,
                decoded.report.layout,
                resolution,
                start
            )
        })
}

#[derive(Serialize)]
struct ColumnSummary<'a> {
    label: &'a str,
    kind: String,
    resolution: u32,
    start_offset: u32,
    len: usize,
    stored: bool,
}

fn print_inspect(decoded: &Decoded, format: OutputFormat) -> anyhow::Result<()> {
    let columns: Vec<ColumnSummary> = decoded
        .registry
        .columns()
        .iter()
        .map(|col| {
            let stored = decoded.registry.stored(&col.label);
            ColumnSummary {
                label: &col.label,
                kind: col.kind.to_string(),
                resolution: stored.map_or(col.resolution, |s| s.resolution()),
                start_offset: stored.map_or(col.start_offset, |s| s.start_offset()),
                len: stored.map_or(0, |s| s.len()),
                stored: stored.is_some_and(|s| s.is_final()),
            }
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "report": decoded.report,
                "columns": columns,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for column in &columns {
                writer.serialize(column)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            let report = &decoded.report;
            println!("Layout: {}", report.layout);
            println!("  Rows processed: {}", report.rows_processed);
            println!("  Rows failed: {}", report.rows_failed);
            println!("  Padded values: {}", report.padded);
            println!();

            println!(
                "{:<10} {:<8} {:>10} {:>8} {:>8}",
                "Label", "Type", "Resolution", "Start", "Length"
            );
            println!("{}", "-".repeat(48));
            for column in &columns {
                let len = if column.stored {
                    column.len.to_string()
                } else {
                    "-".to_string()
                };
                println!(
                    "{:<10} {:<8} {:>10} {:>8} {:>8}",
                    column.label, column.kind, column.resolution, column.start_offset, len
                );
            }

            if !report.unfinalized.is_empty() {
                println!();
                println!("Not finalized:");
                for entry in &report.unfinalized {
                    println!("  {}", entry);
                }
            }
        }
    }
    Ok(())
}

fn value_cell(values: &ReportValues, delay: usize) -> String {
    match values {
        ReportValues::Int(v) => v.get(delay).map(|x| x.to_string()).unwrap_or_default(),
        ReportValues::Double(v) => v.get(delay).map(|x| format!("{:.4}", x)).unwrap_or_default(),
    }
}

fn print_correlation(report: &CorrelationReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["delay", "lag_minutes", "value"])?;
            for delay in 0..report.values.len() {
                writer.write_record([
                    delay.to_string(),
                    report.lag_minutes(delay).to_string(),
                    value_cell(&report.values, delay),
                ])?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            let mut out = std::io::stdout().lock();
            writeln!(
                out,
                "{} x {} at {} min, start +{} min",
                report.short, report.long, report.resolution, report.start_offset
            )?;
            if let Some([short, long]) = report.offset_mismatch {
                writeln!(out, "warning: start offsets differ ({} vs {})", short, long)?;
            }
            writeln!(out)?;
            writeln!(out, "{:>6} {:>10} {:>16}", "Delay", "Lag (min)", "Value")?;
            writeln!(out, "{}", "-".repeat(34))?;
            for delay in 0..report.values.len() {
                writeln!(
                    out,
                    "{:>6} {:>10} {:>16}",
                    delay,
                    report.lag_minutes(delay),
                    value_cell(&report.values, delay)
                )?;
            }

            if let (Some(delay), Some(lag)) = (report.peak_delay, report.peak_lag_minutes) {
                writeln!(out)?;
                writeln!(
                    out,
                    "Peak at delay {} ({} min): {}",
                    delay,
                    lag,
                    value_cell(&report.values, delay)
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_series_arg() {
        let (path, label) = split_series_arg("data/ace_mag.txt:BZ").unwrap();
        assert_eq!(path, Path::new("data/ace_mag.txt"));
        assert_eq!(label, "BZ");

        let (path, label) = split_series_arg("C:/data/goes.txt:P10").unwrap();
        assert_eq!(path, Path::new("C:/data/goes.txt"));
        assert_eq!(label, "P10");

        assert!(split_series_arg("ace_mag.txt").is_err());
        assert!(split_series_arg("ace_mag.txt:").is_err());
    }

    #[test]
    fn test_cli_parses_correlate() {
        let cli = Cli::try_parse_from([
            "crosscorr",
            "correlate",
            "--short",
            "a.txt:BZ",
            "--long",
            "b.txt:SPEED",
            "--layout-short",
            "ace-mag",
            "--layout-long",
            "ace-swe",
            "-r",
            "5",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Correlate {
                resolution, start, layout_long, ..
            } => {
                assert_eq!(resolution, Some(5));
                assert_eq!(start, None);
                assert_eq!(layout_long.as_deref(), Some("ace-swe"));
            }
            _ => panic!("expected correlate"),
        }
    }

    #[test]
    fn test_value_cell() {
        assert_eq!(value_cell(&ReportValues::Int(vec![3, 4]), 1), "4");
        assert_eq!(value_cell(&ReportValues::Double(vec![0.5]), 0), "0.5000");
        assert_eq!(value_cell(&ReportValues::Double(vec![]), 0), "");
    }
}
