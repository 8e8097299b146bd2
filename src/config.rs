//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Series and correlation settings
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Fill every column with zeros up to a full day before finalizing
    #[serde(default = "default_pad_to_day")]
    pub pad_to_day: bool,

    /// Resolution (minutes) used when the CLI is not given one
    #[serde(default = "default_resolution")]
    pub default_resolution: u32,

    #[serde(default)]
    pub default_start_offset: u32,
}

fn default_pad_to_day() -> bool {
    true
}

fn default_resolution() -> u32 {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pad_to_day: default_pad_to_day(),
            default_resolution: default_resolution(),
            default_start_offset: 0,
        }
    }
}

/// Text decoder settings
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Readings that mean "no data"
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<f64>,

    /// Value stored in place of a sentinel
    #[serde(default)]
    pub replacement: f64,
}

fn default_sentinels() -> Vec<f64> {
    vec![-999.9, -9999.9, -100000.0]
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sentinels: default_sentinels(),
            replacement: 0.0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("crosscorr").join("config.toml")),
            Some(PathBuf::from("./crosscorr.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(pad) = lookup("CROSSCORR_PAD_TO_DAY") {
            match pad.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.analysis.pad_to_day = true,
                "0" | "false" | "no" => self.analysis.pad_to_day = false,
                other => tracing::warn!(value = other, "ignoring CROSSCORR_PAD_TO_DAY"),
            }
        }

        if let Some(level) = lookup("CROSSCORR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CROSSCORR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# crosscorr configuration
#
# Environment variables override these settings:
# - CROSSCORR_PAD_TO_DAY
# - CROSSCORR_LOG_LEVEL
# - CROSSCORR_LOG_FORMAT

[analysis]
# Pad every column with zeros to a full UTC day before finalizing
pad_to_day = true

# Resolution in minutes when a command does not specify one
default_resolution = 5

# Start offset in minutes after 00:00 UTC
default_start_offset = 0

[ingest]
# Readings that mean "no data"
sentinels = [-999.9, -9999.9, -100000.0]

# Value stored in their place
replacement = 0.0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
