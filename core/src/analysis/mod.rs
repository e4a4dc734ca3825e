//! Drift/Performance Analyzer
//!
//! Compares a reconciled reference dataset against reconciled production data:
//! - per-column distribution drift over the four features
//! - drift of the `target` class distribution
//! - classification quality of `target` vs `prediction`
//!
//! The analyzer holds no state between runs; identical inputs give identical
//! scores.

pub mod classification;
pub mod html;
pub mod report;
pub mod stattest;

pub use classification::ClassificationScores;
pub use report::{
    ClassificationQualityMetric, ColumnDrift, DataDriftMetric, DriftReport, MetricKind,
    ReportMetric, StatTest, TargetDriftMetric,
};

use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::{Label, ReconciledDataset};
use crate::error::AnalysisError;

/// Thresholds for the drift checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// KS p-value below which a column drifts
    pub stattest_threshold: f64,
    /// Normed Wasserstein distance at or above which a column drifts
    pub wasserstein_threshold: f64,
    /// Reference size above which Wasserstein replaces KS
    pub large_sample_cutoff: usize,
    /// Share of drifted columns that marks the whole dataset as drifted
    pub drift_share: f64,
    /// Jensen-Shannon distance at or above which the target drifts
    pub target_drift_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stattest_threshold: 0.05,
            wasserstein_threshold: 0.1,
            large_sample_cutoff: 1000,
            drift_share: 0.5,
            target_drift_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DriftAnalyzer {
    config: AnalysisConfig,
}

impl DriftAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every check and assemble the report.
    pub fn analyze(
        &self,
        reference: &ReconciledDataset,
        current: &ReconciledDataset,
    ) -> Result<DriftReport, AnalysisError> {
        for dataset in [reference, current] {
            if dataset.is_empty() {
                return Err(AnalysisError::EmptyDataset(dataset.role().to_string()));
            }
        }

        info!(
            reference_rows = reference.len(),
            current_rows = current.len(),
            "Running report analysis"
        );

        let data_drift = self.data_drift(reference, current);
        let target_drift = self.target_drift(reference, current);
        let quality = ClassificationQualityMetric {
            reference: ClassificationScores::compute(reference.target(), reference.prediction())?,
            current: ClassificationScores::compute(current.target(), current.prediction())?,
        };

        Ok(DriftReport {
            generated_at: Local::now(),
            reference_rows: reference.len(),
            current_rows: current.len(),
            metrics: vec![
                ReportMetric::DataDrift(data_drift),
                ReportMetric::TargetDrift(target_drift),
                ReportMetric::ClassificationQuality(quality),
            ],
        })
    }

    fn data_drift(&self, reference: &ReconciledDataset, current: &ReconciledDataset) -> DataDriftMetric {
        let use_ks = reference.len() <= self.config.large_sample_cutoff;

        let columns: Vec<ColumnDrift> = reference
            .features()
            .zip(current.features())
            .map(|((name, ref_values), (_, cur_values))| {
                let (stattest, statistic, threshold, drifted) = if use_ks {
                    let ks = stattest::ks_two_sample(ref_values, cur_values);
                    let threshold = self.config.stattest_threshold;
                    (StatTest::KolmogorovSmirnov, ks.p_value, threshold, ks.p_value < threshold)
                } else {
                    let distance = stattest::normed_wasserstein(ref_values, cur_values);
                    let threshold = self.config.wasserstein_threshold;
                    (StatTest::Wasserstein, distance, threshold, distance >= threshold)
                };
                debug!(column = name, statistic, drifted, "Column drift computed");

                ColumnDrift {
                    column: name.to_string(),
                    stattest,
                    statistic,
                    threshold,
                    drifted,
                    reference_mean: stattest::mean(ref_values),
                    current_mean: stattest::mean(cur_values),
                }
            })
            .collect();

        let drifted_columns = columns.iter().filter(|c| c.drifted).count();
        let share_drifted = if columns.is_empty() {
            0.0
        } else {
            drifted_columns as f64 / columns.len() as f64
        };

        DataDriftMetric {
            drifted_columns,
            share_drifted,
            drift_share: self.config.drift_share,
            dataset_drift: share_drifted >= self.config.drift_share,
            columns,
        }
    }

    fn target_drift(&self, reference: &ReconciledDataset, current: &ReconciledDataset) -> TargetDriftMetric {
        let mut counts: BTreeMap<Label, (f64, f64)> = BTreeMap::new();
        for label in reference.target() {
            counts.entry(*label).or_default().0 += 1.0;
        }
        for label in current.target() {
            counts.entry(*label).or_default().1 += 1.0;
        }

        let ref_total = reference.len() as f64;
        let cur_total = current.len() as f64;
        let distribution: Vec<(Label, f64, f64)> = counts
            .iter()
            .map(|(label, (r, c))| (*label, r / ref_total, c / cur_total))
            .collect();

        let p: Vec<f64> = distribution.iter().map(|(_, r, _)| *r).collect();
        let q: Vec<f64> = distribution.iter().map(|(_, _, c)| *c).collect();
        let distance = stattest::jensen_shannon_distance(&p, &q);
        let threshold = self.config.target_drift_threshold;

        TargetDriftMetric {
            distance,
            threshold,
            drifted: distance >= threshold,
            distribution,
        }
    }
}
