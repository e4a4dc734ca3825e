//! Metrics Publisher
//!
//! Moves report scores and logged-prediction quality into the gauges. Failures
//! here are logged and swallowed: callers always get a snapshot back, even if
//! some gauges are stale.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::analysis::{ClassificationScores, DriftReport, MetricKind};
use crate::data::{dataset::has_column, DatasetRole, ReconciledDataset, SchemaReconciler, TARGET};
use crate::error::{MonitorError, Result};
use crate::metrics::{MetricSnapshot, MonitoringMetrics};
use crate::store::PredictionStore;

#[derive(Debug, Clone)]
pub struct MetricsPublisher {
    metrics: Arc<MonitoringMetrics>,
}

impl MetricsPublisher {
    pub fn new(metrics: Arc<MonitoringMetrics>) -> Self {
        Self { metrics }
    }

    /// Publish drift scores and prediction-log quality, then read the gauges.
    pub fn publish(&self, report: &DriftReport, store: &PredictionStore) -> MetricSnapshot {
        if let Err(e) = self.publish_report(report) {
            error!("Error updating monitoring metrics: {}", e);
        }
        if let Err(e) = self.publish_performance(store) {
            error!("Error updating monitoring metrics: {}", e);
        }
        self.metrics.snapshot()
    }

    /// Drift gauges, keyed by metric kind
    pub fn publish_report(&self, report: &DriftReport) -> Result<()> {
        let data_drift = report.score(MetricKind::DataDrift).ok_or_else(|| {
            MonitorError::NotFound("data drift metric missing from report".to_string())
        })?;
        let target_drift = report.score(MetricKind::TargetDrift).ok_or_else(|| {
            MonitorError::NotFound("target drift metric missing from report".to_string())
        })?;

        self.metrics.data_drift_score.set(data_drift);
        self.metrics.target_drift_score.set(target_drift);
        info!(data_drift, target_drift, "Drift metrics updated");
        Ok(())
    }

    /// Accuracy and F1 over the prediction log. An empty log, or one without a
    /// `target` column, leaves the gauges untouched.
    pub fn publish_performance(&self, store: &PredictionStore) -> Result<Option<ClassificationScores>> {
        let mut frame = store.load()?;
        if frame.height() == 0 {
            warn!("Prediction log is empty; performance metrics not updated");
            return Ok(None);
        }
        if !has_column(&frame, TARGET) {
            warn!("Prediction log has no target column; performance metrics not updated");
            return Ok(None);
        }

        SchemaReconciler::new().reconcile(DatasetRole::Current, &mut frame)?;
        let dataset = ReconciledDataset::from_frame(DatasetRole::Current, &frame)?;
        let scores = ClassificationScores::compute(dataset.target(), dataset.prediction())?;

        self.metrics.model_accuracy.set(scores.accuracy);
        self.metrics.model_f1.set(scores.f1);
        info!(
            "Performance metrics updated - Accuracy: {:.3}, F1: {:.3}",
            scores.accuracy, scores.f1
        );
        Ok(Some(scores))
    }
}
