//! Service layer
//!
//! [`PredictionService`] scores single rows and logs them; [`MonitoringService`]
//! runs one drift analysis cycle end to end. Both are synchronous and expect
//! to be driven from a blocking context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::analysis::DriftAnalyzer;
use crate::archive::ReportArchive;
use crate::data::{load_csv, DatasetRole, FeatureRow, Label, PredictionRecord, ReconciledDataset, SchemaReconciler};
use crate::error::{ModelError, Result};
use crate::metrics::{MetricSnapshot, MonitoringMetrics};
use crate::model::Classifier;
use crate::publisher::MetricsPublisher;
use crate::store::PredictionStore;

pub struct PredictionService {
    model: Arc<dyn Classifier>,
    store: Arc<PredictionStore>,
    metrics: Arc<MonitoringMetrics>,
}

impl PredictionService {
    pub fn new(
        model: Arc<dyn Classifier>,
        store: Arc<PredictionStore>,
        metrics: Arc<MonitoringMetrics>,
    ) -> Self {
        Self {
            model,
            store,
            metrics,
        }
    }

    /// Score one row, count it and append it to the prediction log.
    ///
    /// The row is only logged once the model has answered; a failed append
    /// fails the whole call.
    pub fn predict(&self, row: FeatureRow) -> Result<Label> {
        let started = Instant::now();
        let outcome = self.model.predict(std::slice::from_ref(&row));
        self.metrics
            .prediction_duration
            .observe(started.elapsed().as_secs_f64());

        let label = match outcome {
            Ok(labels) => labels.first().copied().ok_or_else(|| {
                ModelError::Invocation("model returned no prediction".to_string())
            })?,
            Err(e) => {
                error!("Prediction error: {}", e);
                return Err(e.into());
            }
        };

        self.metrics.record_prediction(label);
        self.store.append(&PredictionRecord::provisional(row, label))?;

        info!(prediction = label, "Prediction served");
        Ok(label)
    }
}

/// Result of one drift-report request
#[derive(Debug, Clone, PartialEq)]
pub enum DriftReportOutcome {
    /// Analysis ran and the HTML report was archived at `report_path`
    Completed {
        report_path: PathBuf,
        metrics: MetricSnapshot,
    },
    /// The prediction log was empty; nothing was analysed or archived
    Skipped { metrics: MetricSnapshot },
}

impl DriftReportOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            DriftReportOutcome::Completed { .. } => "success",
            DriftReportOutcome::Skipped { .. } => "skipped",
        }
    }

    pub fn message(&self) -> String {
        match self {
            DriftReportOutcome::Completed { report_path, .. } => {
                let name = report_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("Report generated successfully: {name}")
            }
            DriftReportOutcome::Skipped { .. } => {
                "No predictions logged yet; drift analysis skipped".to_string()
            }
        }
    }

    pub fn metrics(&self) -> MetricSnapshot {
        match self {
            DriftReportOutcome::Completed { metrics, .. } | DriftReportOutcome::Skipped { metrics } => {
                *metrics
            }
        }
    }
}

pub struct MonitoringService {
    reference_path: PathBuf,
    store: Arc<PredictionStore>,
    analyzer: DriftAnalyzer,
    archive: ReportArchive,
    publisher: MetricsPublisher,
    metrics: Arc<MonitoringMetrics>,
}

impl MonitoringService {
    pub fn new(
        reference_path: impl AsRef<Path>,
        store: Arc<PredictionStore>,
        analyzer: DriftAnalyzer,
        archive: ReportArchive,
        metrics: Arc<MonitoringMetrics>,
    ) -> Self {
        Self {
            reference_path: reference_path.as_ref().to_path_buf(),
            store,
            analyzer,
            archive,
            publisher: MetricsPublisher::new(metrics.clone()),
            metrics,
        }
    }

    pub fn archive(&self) -> &ReportArchive {
        &self.archive
    }

    /// Run one analysis cycle: load, reconcile, analyse, archive, publish.
    pub fn run_drift_report(&self) -> Result<DriftReportOutcome> {
        let result = self.run_cycle();
        if let Err(e) = &result {
            error!("Error generating drift report: {}", e);
        }
        result
    }

    fn run_cycle(&self) -> Result<DriftReportOutcome> {
        info!("Loading reference data from {}", self.reference_path.display());
        let mut reference = load_csv(&self.reference_path)?;
        let mut current = self.store.load()?;

        if current.height() == 0 {
            warn!("Prediction log is empty; skipping drift analysis");
            return Ok(DriftReportOutcome::Skipped {
                metrics: self.metrics.snapshot(),
            });
        }

        SchemaReconciler::new().reconcile_pair(&mut reference, &mut current)?;
        let reference = ReconciledDataset::from_frame(DatasetRole::Reference, &reference)?;
        let current = ReconciledDataset::from_frame(DatasetRole::Current, &current)?;

        let report = self.analyzer.analyze(&reference, &current)?;
        let report_path = self.archive.save(&report)?;
        let metrics = self.publisher.publish(&report, &self.store);

        Ok(DriftReportOutcome::Completed {
            report_path,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MonitorError, SchemaError};
    use std::fs;
    use tempfile::TempDir;

    struct FixedClassifier(Label);

    impl Classifier for FixedClassifier {
        fn predict(&self, rows: &[FeatureRow]) -> std::result::Result<Vec<Label>, ModelError> {
            Ok(vec![self.0; rows.len()])
        }

        fn classes(&self) -> &[Label] {
            &[0, 1, 2]
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn predict(&self, _rows: &[FeatureRow]) -> std::result::Result<Vec<Label>, ModelError> {
            Err(ModelError::Invocation("feature count mismatch".to_string()))
        }

        fn classes(&self) -> &[Label] {
            &[]
        }
    }

    const REFERENCE: &str = "sepal_length_cm,sepal_width_cm,petal_length_cm,petal_width_cm,target\n\
        5.1,3.5,1.4,0.2,0\n\
        4.9,3.0,1.4,0.2,0\n\
        7.0,3.2,4.7,1.4,1\n\
        6.4,3.2,4.5,1.5,1\n\
        6.3,3.3,6.0,2.5,2\n\
        5.8,2.7,5.1,1.9,2\n";

    fn monitoring(dir: &TempDir, reference: &str) -> (MonitoringService, Arc<PredictionStore>, Arc<MonitoringMetrics>) {
        let reference_path = dir.path().join("reference_data.csv");
        fs::write(&reference_path, reference).expect("write reference");
        let store = Arc::new(PredictionStore::new(dir.path().join("predictions_log.csv")));
        let metrics = Arc::new(MonitoringMetrics::new().expect("metrics"));
        let service = MonitoringService::new(
            &reference_path,
            store.clone(),
            DriftAnalyzer::default(),
            ReportArchive::new(dir.path().join("reports")),
            metrics.clone(),
        );
        (service, store, metrics)
    }

    #[test]
    fn test_predict_logs_one_row_and_counts() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(PredictionStore::new(dir.path().join("predictions_log.csv")));
        let metrics = Arc::new(MonitoringMetrics::new().expect("metrics"));
        let service = PredictionService::new(Arc::new(FixedClassifier(2)), store.clone(), metrics.clone());

        let label = service
            .predict(FeatureRow::new(6.3, 3.3, 6.0, 2.5))
            .expect("prediction");

        assert_eq!(label, 2);
        assert_eq!(store.count().expect("count"), 1);
        assert_eq!(metrics.predictions_total.get(), 1);
        assert_eq!(metrics.prediction_class.with_label_values(&["2"]).get(), 1);
        assert_eq!(metrics.prediction_duration.get_sample_count(), 1);
    }

    #[test]
    fn test_model_failure_logs_nothing() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(PredictionStore::new(dir.path().join("predictions_log.csv")));
        let metrics = Arc::new(MonitoringMetrics::new().expect("metrics"));
        let service = PredictionService::new(Arc::new(FailingClassifier), store.clone(), metrics.clone());

        let result = service.predict(FeatureRow::new(5.1, 3.5, 1.4, 0.2));

        assert!(matches!(result, Err(MonitorError::Model(ModelError::Invocation(_)))));
        assert_eq!(store.count().expect("count"), 0);
        assert_eq!(metrics.predictions_total.get(), 0);
    }

    #[test]
    fn test_empty_log_skips_analysis() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let (service, _store, metrics) = monitoring(&dir, REFERENCE);
        metrics.model_accuracy.set(0.4);

        let outcome = service.run_drift_report().expect("report");

        assert_eq!(outcome.status(), "skipped");
        assert_eq!(outcome.metrics().model_accuracy, 0.4);
        assert!(service.archive().list().expect("list").is_empty());
    }

    #[test]
    fn test_report_cycle_archives_and_publishes() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let (service, store, _metrics) = monitoring(&dir, REFERENCE);
        for (row, label) in [
            (FeatureRow::new(5.0, 3.4, 1.5, 0.2), 0),
            (FeatureRow::new(6.7, 3.1, 4.4, 1.4), 1),
            (FeatureRow::new(6.5, 3.0, 5.8, 2.2), 2),
        ] {
            store
                .append(&PredictionRecord::provisional(row, label))
                .expect("append");
        }

        let outcome = service.run_drift_report().expect("report");

        assert_eq!(outcome.status(), "success");
        let metrics = outcome.metrics();
        assert_eq!(metrics.model_accuracy, 1.0);
        assert_eq!(metrics.model_f1, 1.0);
        assert!((0.0..=1.0).contains(&metrics.data_drift_score));
        assert_eq!(service.archive().list().expect("list").len(), 1);
        match outcome {
            DriftReportOutcome::Completed { report_path, .. } => assert!(report_path.is_file()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_reference_without_petal_width_fails() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let reference = "sepal_length_cm,sepal_width_cm,petal_length_cm,target\n5.1,3.5,1.4,0\n";
        let (service, store, _metrics) = monitoring(&dir, reference);
        store
            .append(&PredictionRecord::provisional(FeatureRow::new(5.1, 3.5, 1.4, 0.2), 0))
            .expect("append");

        let err = service.run_drift_report().expect_err("schema error");

        match &err {
            MonitorError::Schema(SchemaError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, &vec!["petal_width_cm".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("petal_width_cm"));
    }
}
