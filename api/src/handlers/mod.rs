//! API Handlers Module
//!
//! This module contains the request handlers for the API system. Model
//! invocation, CSV I/O and analysis are blocking and run on the blocking pool.

use std::fs;
use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{IntoResponse, Json},
};
use iris_monitor_core::{
    archive::ReportArchive, config::Settings, metrics::TEXT_CONTENT_TYPE, Classifier, DriftAnalyzer,
    FeatureRow, MonitoringMetrics, MonitoringService, PredictionService, PredictionStore,
};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::{DriftReportResponse, HealthResponse, PredictRequest, PredictResponse};

/// Path segment that resolves to the newest archived report
pub const LATEST_REPORT: &str = "latest";

const SERVICE_NAME: &str = "iris-monitor";

/// Represents the state of the API server
pub struct ApiState {
    /// Scores and logs single rows
    pub prediction: Arc<PredictionService>,
    /// Runs drift analysis and owns the report archive
    pub monitoring: Arc<MonitoringService>,
    /// Registry rendered at `/metrics`
    pub metrics: Arc<MonitoringMetrics>,
}

impl ApiState {
    /// Wire the services from settings around an already loaded model.
    ///
    /// Creates the reports directory and the prediction log's parent directory.
    pub fn from_settings(settings: &Settings, model: Arc<dyn Classifier>) -> anyhow::Result<Self> {
        let paths = &settings.paths;
        let metrics = Arc::new(MonitoringMetrics::new()?);
        let store = Arc::new(PredictionStore::new(&paths.prediction_log));
        if let Some(parent) = paths.prediction_log.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let archive = ReportArchive::new(&paths.reports_dir);
        archive.ensure_dir()?;
        info!("Serving reports from {}", archive.dir().display());

        let prediction = PredictionService::new(model, store.clone(), metrics.clone());
        let monitoring = MonitoringService::new(
            &paths.reference_data,
            store,
            DriftAnalyzer::new(settings.analysis.clone()),
            archive,
            metrics.clone(),
        );

        Ok(Self {
            prediction: Arc::new(prediction),
            monitoring: Arc::new(monitoring),
            metrics,
        })
    }
}

/// Health check endpoint
#[debug_handler]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

/// Score one iris measurement
#[debug_handler]
pub async fn predict(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let row = FeatureRow::from(request);

    let invalid = row.invalid_fields();
    if !invalid.is_empty() {
        return Err(ApiError::Validation(format!(
            "measurements must be finite positive numbers: {}",
            invalid.join(", ")
        )));
    }

    let service = state.prediction.clone();
    let prediction = tokio::task::spawn_blocking(move || service.predict(row))
        .await?
        .map_err(|e| ApiError::Internal(format!("Error during prediction: {e}")))?;

    Ok(Json(PredictResponse { prediction }))
}

/// Run one drift analysis cycle and return the published scores
#[debug_handler]
pub async fn drift_report(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<DriftReportResponse>, ApiError> {
    let service = state.monitoring.clone();
    let outcome = tokio::task::spawn_blocking(move || service.run_drift_report()).await??;

    Ok(Json(DriftReportResponse::from(outcome)))
}

/// Serve an archived report; `latest` resolves to the newest one
#[debug_handler]
pub async fn get_report(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let archive = state.monitoring.archive();
    let path = if name == LATEST_REPORT {
        archive.latest()?
    } else {
        archive.resolve(&name)?
    };
    debug!("Serving report {}", path.display());

    let body = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read {}: {}", path.display(), e)))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = if file_name.ends_with(".html") {
        "text/html; charset=utf-8"
    } else {
        "application/octet-stream"
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{file_name}\""),
            ),
        ],
        body,
    ))
}

/// Prometheus scrape endpoint
#[debug_handler]
pub async fn metrics(State(state): State<Arc<ApiState>>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body))
}
