//! Data Model
//!
//! Feature rows as received by the service, the records written to the
//! prediction log, and the tabular datasets read back for analysis.

pub mod dataset;
pub mod reconciler;

pub use dataset::{load_csv, DatasetRole, ReconciledDataset};
pub use reconciler::SchemaReconciler;

use serde::{Deserialize, Serialize};

pub const SEPAL_LENGTH: &str = "sepal_length_cm";
pub const SEPAL_WIDTH: &str = "sepal_width_cm";
pub const PETAL_LENGTH: &str = "petal_length_cm";
pub const PETAL_WIDTH: &str = "petal_width_cm";
pub const PREDICTION: &str = "prediction";
pub const TARGET: &str = "target";

/// Required feature columns, in log order
pub const FEATURE_COLUMNS: [&str; 4] = [SEPAL_LENGTH, SEPAL_WIDTH, PETAL_LENGTH, PETAL_WIDTH];

/// Integer class label produced by the classifier
pub type Label = i64;

/// One flower measurement, in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub sepal_length_cm: f64,
    pub sepal_width_cm: f64,
    pub petal_length_cm: f64,
    pub petal_width_cm: f64,
}

impl FeatureRow {
    pub fn new(
        sepal_length_cm: f64,
        sepal_width_cm: f64,
        petal_length_cm: f64,
        petal_width_cm: f64,
    ) -> Self {
        Self {
            sepal_length_cm,
            sepal_width_cm,
            petal_length_cm,
            petal_width_cm,
        }
    }

    /// Values in [`FEATURE_COLUMNS`] order
    pub fn values(&self) -> [f64; 4] {
        [
            self.sepal_length_cm,
            self.sepal_width_cm,
            self.petal_length_cm,
            self.petal_width_cm,
        ]
    }

    /// Returns the name of every measurement that is not a finite positive number.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        FEATURE_COLUMNS
            .iter()
            .zip(self.values())
            .filter(|(_, v)| !v.is_finite() || *v <= 0.0)
            .map(|(name, _)| *name)
            .collect()
    }
}

/// A scored row as persisted in the prediction log.
///
/// True labels are not known when a request is served, so `target` holds a
/// copy of `prediction`. Accuracy and F1 computed over the log therefore
/// measure agreement with the model itself, not production quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(flatten)]
    pub features: FeatureRow,
    pub prediction: Label,
    pub target: Label,
}

impl PredictionRecord {
    /// Build a record whose provisional target is the prediction itself.
    pub fn provisional(features: FeatureRow, prediction: Label) -> Self {
        Self {
            features,
            prediction,
            target: prediction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_row_values_follow_column_order() {
        let row = FeatureRow::new(5.1, 3.5, 1.4, 0.2);
        assert_eq!(row.values(), [5.1, 3.5, 1.4, 0.2]);
    }

    #[test]
    fn test_invalid_fields_reports_non_positive_and_non_finite() {
        let row = FeatureRow::new(5.1, 0.0, f64::NAN, -1.0);
        assert_eq!(
            row.invalid_fields(),
            vec![SEPAL_WIDTH, PETAL_LENGTH, PETAL_WIDTH]
        );
        assert!(FeatureRow::new(5.1, 3.5, 1.4, 0.2).invalid_fields().is_empty());
    }

    #[test]
    fn test_provisional_record_copies_prediction_into_target() {
        let record = PredictionRecord::provisional(FeatureRow::new(6.3, 3.3, 6.0, 2.5), 2);
        assert_eq!(record.prediction, 2);
        assert_eq!(record.target, 2);
    }
}
