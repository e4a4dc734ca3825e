//! Configuration Management Module
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `IRIS_MONITOR__`-prefixed environment variables (`__` separates nesting
//! levels, e.g. `IRIS_MONITOR__SERVER__PORT=9000`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::AnalysisConfig;
use crate::error::{MonitorError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "iris-monitor.toml";
pub const ENV_PREFIX: &str = "IRIS_MONITOR";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Files and directories the service reads and writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Trained classifier (JSON)
    pub model: PathBuf,
    /// Operator-provided reference dataset (read-only)
    pub reference_data: PathBuf,
    /// Append-only prediction log
    pub prediction_log: PathBuf,
    /// Archived HTML reports
    pub reports_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("model/iris_model.json"),
            reference_data: PathBuf::from("model/reference_data.csv"),
            prediction_log: PathBuf::from("model/predictions_log.csv"),
            reports_dir: PathBuf::from("monitoring/reports"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load settings from `path` (or the default file, if present) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let required = path.is_some();

        let settings: Settings = Config::builder()
            .add_source(File::from(file).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!("Loaded settings from {} (required: {})", file.display(), required);
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(MonitorError::Config("server port must be greater than 0".to_string()));
        }

        let analysis = &self.analysis;
        for (name, value) in [
            ("stattest_threshold", analysis.stattest_threshold),
            ("wasserstein_threshold", analysis.wasserstein_threshold),
            ("drift_share", analysis.drift_share),
            ("target_drift_threshold", analysis.target_drift_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(MonitorError::Config(format!(
                    "analysis.{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if analysis.large_sample_cutoff == 0 {
            return Err(MonitorError::Config(
                "analysis.large_sample_cutoff must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Listener address as `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_service_layout() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address(), "0.0.0.0:8000");
        assert_eq!(settings.paths.prediction_log, PathBuf::from("model/predictions_log.csv"));
        assert_eq!(settings.paths.reports_dir, PathBuf::from("monitoring/reports"));
        assert_eq!(settings.analysis.stattest_threshold, 0.05);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("iris-monitor.toml");
        fs::write(
            &path,
            "[server]\nport = 9100\n\n[analysis]\ndrift_share = 0.25\n\n[logging]\njson = true\n",
        )
        .expect("write config");

        let settings = Settings::load(Some(&path)).expect("load should succeed");
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.analysis.drift_share, 0.25);
        assert_eq!(settings.analysis.large_sample_cutoff, 1000);
        assert!(settings.logging.json);
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let result = Settings::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_bad_thresholds() {
        let mut settings = Settings::default();
        settings.analysis.drift_share = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.analysis.large_sample_cutoff = 0;
        assert!(settings.validate().is_err());
    }
}
