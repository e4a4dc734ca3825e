//! Drift report
//!
//! One report per analysis run. Metrics are looked up by [`MetricKind`];
//! their order inside the report only affects rendering.

use chrono::{DateTime, Local};
use serde::Serialize;

use super::classification::ClassificationScores;
use super::html;
use crate::data::Label;

/// Identifies a metric inside a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    DataDrift,
    TargetDrift,
    ClassificationQuality,
}

impl MetricKind {
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::DataDrift => "Data Drift",
            MetricKind::TargetDrift => "Target Drift",
            MetricKind::ClassificationQuality => "Classification Quality",
        }
    }
}

/// Test applied to a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTest {
    KolmogorovSmirnov,
    Wasserstein,
}

impl StatTest {
    pub fn name(&self) -> &'static str {
        match self {
            StatTest::KolmogorovSmirnov => "K-S p_value",
            StatTest::Wasserstein => "Wasserstein distance (normed)",
        }
    }
}

/// Drift verdict for one feature column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDrift {
    pub column: String,
    pub stattest: StatTest,
    /// p-value for KS, normed distance for Wasserstein
    pub statistic: f64,
    pub threshold: f64,
    pub drifted: bool,
    pub reference_mean: f64,
    pub current_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataDriftMetric {
    pub columns: Vec<ColumnDrift>,
    pub drifted_columns: usize,
    /// Share of drifted columns in [0, 1]
    pub share_drifted: f64,
    pub drift_share: f64,
    pub dataset_drift: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetDriftMetric {
    /// Jensen-Shannon distance between class frequencies
    pub distance: f64,
    pub threshold: f64,
    pub drifted: bool,
    /// (label, reference share, current share)
    pub distribution: Vec<(Label, f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationQualityMetric {
    pub reference: ClassificationScores,
    pub current: ClassificationScores,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportMetric {
    DataDrift(DataDriftMetric),
    TargetDrift(TargetDriftMetric),
    ClassificationQuality(ClassificationQualityMetric),
}

impl ReportMetric {
    pub fn kind(&self) -> MetricKind {
        match self {
            ReportMetric::DataDrift(_) => MetricKind::DataDrift,
            ReportMetric::TargetDrift(_) => MetricKind::TargetDrift,
            ReportMetric::ClassificationQuality(_) => MetricKind::ClassificationQuality,
        }
    }

    /// Headline scalar for the metric
    pub fn score(&self) -> f64 {
        match self {
            ReportMetric::DataDrift(m) => m.share_drifted,
            ReportMetric::TargetDrift(m) => m.distance,
            ReportMetric::ClassificationQuality(m) => m.current.accuracy,
        }
    }
}

/// Result of one analyzer run
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub generated_at: DateTime<Local>,
    pub reference_rows: usize,
    pub current_rows: usize,
    pub metrics: Vec<ReportMetric>,
}

impl DriftReport {
    pub fn metric(&self, kind: MetricKind) -> Option<&ReportMetric> {
        self.metrics.iter().find(|m| m.kind() == kind)
    }

    pub fn score(&self, kind: MetricKind) -> Option<f64> {
        self.metric(kind).map(ReportMetric::score)
    }

    /// Scores keyed by kind, in report order
    pub fn scores(&self) -> Vec<(MetricKind, f64)> {
        self.metrics.iter().map(|m| (m.kind(), m.score())).collect()
    }

    /// Standalone HTML document for human inspection
    pub fn render_html(&self) -> String {
        html::render(self)
    }
}
