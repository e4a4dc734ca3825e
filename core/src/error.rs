//! Monitoring errors
//!
//! One enum per failure domain, rolled up into [`MonitorError`] for the
//! service layer.

use std::io;
use std::path::PathBuf;

/// Dataset shape problems found while aligning reference and current data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Neither 'target' nor 'prediction' column found in {dataset} data")]
    MissingLabelColumns { dataset: String },

    #[error("Missing required columns in {dataset} data: {}", .columns.join(", "))]
    MissingColumns {
        dataset: String,
        columns: Vec<String>,
    },

    #[error("Column '{column}' in {dataset} data has {count} missing or non-numeric value(s), first at row {first_row}")]
    MissingValues {
        dataset: String,
        column: String,
        count: usize,
        first_row: usize,
    },
}

/// Classifier failures
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to load model from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Failed to save model to {path}: {reason}")]
    Save { path: PathBuf, reason: String },

    #[error("Model training failed: {0}")]
    Training(String),

    #[error("Model invocation failed: {0}")]
    Invocation(String),
}

/// Statistical comparison failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("The {0} dataset is empty")]
    EmptyDataset(String),

    #[error("Columns '{left}' and '{right}' differ in length: {left_len} vs {right_len}")]
    LengthMismatch {
        left: String,
        right: String,
        left_len: usize,
        right_len: usize,
    },
}

/// Umbrella error for the monitoring services
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Failed to persist to {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    #[error("Dataset error: {0}")]
    Dataset(#[from] polars::error::PolarsError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<config::ConfigError> for MonitorError {
    fn from(err: config::ConfigError) -> Self {
        MonitorError::Config(err.to_string())
    }
}

/// Result type for monitoring operations
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_names_columns() {
        let err = SchemaError::MissingColumns {
            dataset: "reference".to_string(),
            columns: vec!["petal_width_cm".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("petal_width_cm"));
        assert!(message.contains("reference"));
    }

    #[test]
    fn test_schema_error_wraps_into_monitor_error() {
        let err: MonitorError = SchemaError::MissingLabelColumns {
            dataset: "current".to_string(),
        }
        .into();
        assert!(matches!(err, MonitorError::Schema(_)));
        assert!(err.to_string().starts_with("Schema error"));
    }
}
