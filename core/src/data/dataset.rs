//! Tabular datasets
//!
//! CSV files are read into polars frames; once reconciled, a frame is
//! materialised into plain columns for the analyzer.

use std::fmt;
use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use super::{FeatureRow, Label, FEATURE_COLUMNS, PREDICTION, TARGET};
use crate::error::{AnalysisError, Result, SchemaError};

/// Which side of the comparison a dataset sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetRole {
    Reference,
    Current,
}

impl fmt::Display for DatasetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetRole::Reference => write!(f, "reference"),
            DatasetRole::Current => write!(f, "current"),
        }
    }
}

/// Read a headed CSV file into a frame.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        path = %path.display(),
        rows = frame.height(),
        columns = ?frame.get_column_names(),
        "Loaded dataset"
    );
    Ok(frame)
}

pub(crate) fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.get_column_index(name).is_some()
}

/// A dataset whose label and feature columns are known to be present
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledDataset {
    role: DatasetRole,
    features: Vec<Vec<f64>>,
    target: Vec<Label>,
    prediction: Vec<Label>,
}

impl ReconciledDataset {
    /// Materialise a reconciled frame. Every required cell must hold a number.
    pub fn from_frame(role: DatasetRole, frame: &DataFrame) -> Result<Self> {
        let features = FEATURE_COLUMNS
            .iter()
            .map(|name| float_column(role, frame, name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            role,
            features,
            target: label_column(role, frame, TARGET)?,
            prediction: label_column(role, frame, PREDICTION)?,
        })
    }

    /// Build directly from columns, in [`FEATURE_COLUMNS`] order.
    pub fn from_columns(
        role: DatasetRole,
        features: [Vec<f64>; 4],
        target: Vec<Label>,
        prediction: Vec<Label>,
    ) -> std::result::Result<Self, AnalysisError> {
        let expected = target.len();
        let lengths = features
            .iter()
            .map(Vec::len)
            .zip(FEATURE_COLUMNS)
            .chain(std::iter::once((prediction.len(), PREDICTION)));
        for (len, name) in lengths {
            if len != expected {
                return Err(AnalysisError::LengthMismatch {
                    left: TARGET.to_string(),
                    right: name.to_string(),
                    left_len: expected,
                    right_len: len,
                });
            }
        }

        Ok(Self {
            role,
            features: features.into(),
            target,
            prediction,
        })
    }

    pub fn role(&self) -> DatasetRole {
        self.role
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Feature columns paired with their names
    pub fn features(&self) -> impl Iterator<Item = (&'static str, &[f64])> {
        FEATURE_COLUMNS
            .iter()
            .copied()
            .zip(self.features.iter().map(Vec::as_slice))
    }

    /// Feature values regrouped into rows
    pub fn rows(&self) -> Vec<FeatureRow> {
        (0..self.len())
            .map(|i| {
                let value = |column: usize| self.features[column][i];
                FeatureRow::new(value(0), value(1), value(2), value(3))
            })
            .collect()
    }

    pub fn target(&self) -> &[Label] {
        &self.target
    }

    pub fn prediction(&self) -> &[Label] {
        &self.prediction
    }
}

fn float_column(role: DatasetRole, frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = frame.column(name)?.cast(&DataType::Float64)?;
    let values = series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()));
    Ok(collect_required(role, name, values)?)
}

fn label_column(role: DatasetRole, frame: &DataFrame, name: &str) -> Result<Vec<Label>> {
    let series = frame.column(name)?.cast(&DataType::Int64)?;
    let values = series.i64()?.into_iter();
    Ok(collect_required(role, name, values)?)
}

fn collect_required<T>(
    role: DatasetRole,
    column: &str,
    values: impl Iterator<Item = Option<T>>,
) -> std::result::Result<Vec<T>, SchemaError> {
    let mut out = Vec::new();
    let mut missing = 0;
    let mut first_row = None;

    for (row, value) in values.enumerate() {
        match value {
            Some(v) => out.push(v),
            None => {
                missing += 1;
                first_row.get_or_insert(row);
            }
        }
    }

    match first_row {
        None => Ok(out),
        Some(first_row) => Err(SchemaError::MissingValues {
            dataset: role.to_string(),
            column: column.to_string(),
            count: missing,
            first_row,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonitorError;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "sepal_length_cm,sepal_width_cm,petal_length_cm,petal_width_cm,prediction,target";

    #[test]
    fn test_load_csv_and_materialise() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("data.csv");
        fs::write(
            &path,
            format!("{HEADER}\n5.1,3.5,1.4,0.2,0,0\n6.3,3.3,6.0,2.5,2,1\n"),
        )
        .expect("Failed to write csv");

        let frame = load_csv(&path).expect("load should succeed");
        let dataset = ReconciledDataset::from_frame(DatasetRole::Current, &frame)
            .expect("materialise should succeed");

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.prediction(), &[0, 2]);
        assert_eq!(dataset.target(), &[0, 1]);
        let (name, first) = dataset.features().next().expect("feature column");
        assert_eq!(name, "sepal_length_cm");
        assert_eq!(first, &[5.1, 6.3]);
    }

    #[test]
    fn test_missing_cell_is_rejected_with_row() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("data.csv");
        fs::write(
            &path,
            format!("{HEADER}\n5.1,3.5,1.4,0.2,0,0\n6.3,3.3,,2.5,2,2\n"),
        )
        .expect("Failed to write csv");

        let frame = load_csv(&path).expect("load should succeed");
        let err = ReconciledDataset::from_frame(DatasetRole::Reference, &frame).unwrap_err();
        match err {
            MonitorError::Schema(SchemaError::MissingValues {
                column, first_row, ..
            }) => {
                assert_eq!(column, "petal_length_cm");
                assert_eq!(first_row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_columns_rejects_ragged_input() {
        let err = ReconciledDataset::from_columns(
            DatasetRole::Current,
            [vec![1.0], vec![1.0], vec![1.0], vec![1.0, 2.0]],
            vec![0],
            vec![0],
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::LengthMismatch { .. }));
    }
}
