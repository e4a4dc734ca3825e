//! Iris Monitor Core Module
//!
//! Everything behind the HTTP surface: the data model and dataset loading,
//! schema reconciliation, the classifier, the prediction log, drift analysis
//! and its HTML reports, and the metrics registry the analysis publishes into.

pub mod analysis;
pub mod archive;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model;
pub mod publisher;
pub mod service;
pub mod store;

// Re-export commonly used types for easier access
pub use analysis::{AnalysisConfig, DriftAnalyzer, DriftReport, MetricKind};
pub use archive::ReportArchive;
pub use config::Settings;
pub use data::{FeatureRow, Label, PredictionRecord};
pub use error::{AnalysisError, ModelError, MonitorError, Result, SchemaError};
pub use metrics::{MetricSnapshot, MonitoringMetrics};
pub use model::{Classifier, DecisionTreeModel, TrainingParams};
pub use publisher::MetricsPublisher;
pub use service::{DriftReportOutcome, MonitoringService, PredictionService};
pub use store::PredictionStore;
