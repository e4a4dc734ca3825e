//! API Models Module
//!
//! Request and response bodies for the HTTP endpoints.

use iris_monitor_core::{DriftReportOutcome, FeatureRow, Label, MetricSnapshot};
use serde::{Deserialize, Serialize};

/// Body of `POST /predict`; every measurement is required
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictRequest {
    pub sepal_length_cm: f64,
    pub sepal_width_cm: f64,
    pub petal_length_cm: f64,
    pub petal_width_cm: f64,
}

impl From<PredictRequest> for FeatureRow {
    fn from(request: PredictRequest) -> Self {
        FeatureRow::new(
            request.sepal_length_cm,
            request.sepal_width_cm,
            request.petal_length_cm,
            request.petal_width_cm,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Label,
}

/// Body of `GET /monitoring/drift-report`
#[derive(Debug, Clone, Serialize)]
pub struct DriftReportResponse {
    /// `success` or `skipped`
    pub status: String,
    pub message: String,
    pub metrics: MetricSnapshot,
}

impl From<DriftReportOutcome> for DriftReportResponse {
    fn from(outcome: DriftReportOutcome) -> Self {
        Self {
            status: outcome.status().to_string(),
            message: outcome.message(),
            metrics: outcome.metrics(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Error body; mirrors the `detail` field clients already parse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
