//! Monitoring metrics registry
//!
//! An explicit registry shared by reference with every handler. Counters are
//! monotonic; gauges are last-write-wins, so concurrent drift reports race on
//! the published scores.

use std::fmt;

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};
use serde::Serialize;

use crate::error::Result;

pub const PREDICTIONS_TOTAL: &str = "iris_predictions_total";
pub const PREDICTION_DURATION: &str = "iris_prediction_duration_seconds";
pub const PREDICTION_CLASS: &str = "iris_prediction_class_total";
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const DATA_DRIFT_SCORE: &str = "model_data_drift_score";
pub const TARGET_DRIFT_SCORE: &str = "model_target_drift_score";
pub const MODEL_ACCURACY: &str = "model_accuracy";
pub const MODEL_F1: &str = "model_f1_score";

/// Content type of the text exposition format
pub const TEXT_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Current values of the monitoring gauges
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub data_drift_score: f64,
    pub target_drift_score: f64,
    pub model_accuracy: f64,
    pub model_f1: f64,
}

#[derive(Clone)]
pub struct MonitoringMetrics {
    registry: Registry,
    pub predictions_total: IntCounter,
    pub prediction_duration: Histogram,
    pub prediction_class: IntCounterVec,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,
    pub data_drift_score: Gauge,
    pub target_drift_score: Gauge,
    pub model_accuracy: Gauge,
    pub model_f1: Gauge,
}

impl MonitoringMetrics {
    /// Create every family and register it in a fresh registry.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let predictions_total =
            IntCounter::new(PREDICTIONS_TOTAL, "Total number of iris predictions")?;
        let prediction_duration = Histogram::with_opts(HistogramOpts::new(
            PREDICTION_DURATION,
            "Duration of iris predictions in seconds",
        ))?;
        let prediction_class = IntCounterVec::new(
            Opts::new(PREDICTION_CLASS, "Count of predictions by class"),
            &["prediction_class"],
        )?;
        let http_requests_total = IntCounterVec::new(
            Opts::new(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests"),
            &["method", "endpoint"],
        )?;
        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(HTTP_REQUEST_DURATION, "HTTP request latency in seconds"),
            &["method", "endpoint"],
        )?;
        let data_drift_score = Gauge::new(DATA_DRIFT_SCORE, "Data drift score")?;
        let target_drift_score = Gauge::new(TARGET_DRIFT_SCORE, "Target drift score")?;
        let model_accuracy = Gauge::new(MODEL_ACCURACY, "Model accuracy score")?;
        let model_f1 = Gauge::new(MODEL_F1, "Model F1 score")?;

        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(prediction_duration.clone()))?;
        registry.register(Box::new(prediction_class.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(data_drift_score.clone()))?;
        registry.register(Box::new(target_drift_score.clone()))?;
        registry.register(Box::new(model_accuracy.clone()))?;
        registry.register(Box::new(model_f1.clone()))?;

        Ok(Self {
            registry,
            predictions_total,
            prediction_duration,
            prediction_class,
            http_requests_total,
            http_request_duration,
            data_drift_score,
            target_drift_score,
            model_accuracy,
            model_f1,
        })
    }

    /// Count one scored prediction
    pub fn record_prediction(&self, label: i64) {
        let class = label.to_string();
        self.predictions_total.inc();
        self.prediction_class.with_label_values(&[class.as_str()]).inc();
    }

    /// Count one HTTP request and its latency
    pub fn record_request(&self, method: &str, endpoint: &str, seconds: f64) {
        self.http_requests_total
            .with_label_values(&[method, endpoint])
            .inc();
        self.http_request_duration
            .with_label_values(&[method, endpoint])
            .observe(seconds);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            data_drift_score: self.data_drift_score.get(),
            target_drift_score: self.target_drift_score.get(),
            model_accuracy: self.model_accuracy.get(),
            model_f1: self.model_f1.get(),
        }
    }

    /// Render every registered family in the text exposition format.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl fmt::Debug for MonitoringMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitoringMetrics")
            .field("predictions_total", &self.predictions_total.get())
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot_is_zero() {
        let metrics = MonitoringMetrics::new().expect("metrics");
        assert_eq!(
            metrics.snapshot(),
            MetricSnapshot {
                data_drift_score: 0.0,
                target_drift_score: 0.0,
                model_accuracy: 0.0,
                model_f1: 0.0,
            }
        );
    }

    #[test]
    fn test_record_prediction_counts_per_class() {
        let metrics = MonitoringMetrics::new().expect("metrics");
        metrics.record_prediction(0);
        metrics.record_prediction(2);
        metrics.record_prediction(2);

        assert_eq!(metrics.predictions_total.get(), 3);
        assert_eq!(metrics.prediction_class.with_label_values(&["0"]).get(), 1);
        assert_eq!(metrics.prediction_class.with_label_values(&["2"]).get(), 2);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = MonitoringMetrics::new().expect("metrics");
        let second = MonitoringMetrics::new().expect("metrics");
        first.model_accuracy.set(0.9);
        assert_eq!(second.model_accuracy.get(), 0.0);
    }

    #[test]
    fn test_render_exposition() {
        let metrics = MonitoringMetrics::new().expect("metrics");
        metrics.record_prediction(1);
        metrics.record_prediction(1);
        metrics.prediction_duration.observe(0.002);
        metrics.record_request("POST", "/predict", 0.01);
        metrics.model_accuracy.set(0.5);

        let text = metrics.render().expect("render");
        assert!(text.contains("# TYPE iris_predictions_total counter"));
        assert!(text.contains("iris_predictions_total 2\n"));
        assert!(text.contains("iris_prediction_class_total{prediction_class=\"1\"} 2\n"));
        assert!(text.contains("iris_prediction_duration_seconds_bucket{le=\"0.005\"} 1\n"));
        assert!(text.contains("iris_prediction_duration_seconds_bucket{le=\"+Inf\"} 1\n"));
        assert!(text.contains("iris_prediction_duration_seconds_count 1\n"));
        assert!(text.contains("http_requests_total{endpoint=\"/predict\",method=\"POST\"} 1\n"));
        assert!(text.contains("# TYPE model_accuracy gauge"));
        assert!(text.contains("model_accuracy 0.5\n"));
        assert!(text.contains("model_f1_score 0\n"));
    }
}
