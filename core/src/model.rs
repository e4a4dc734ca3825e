//! Classifier
//!
//! The service only needs `predict(features) -> label`. The bundled
//! implementation is a linfa decision tree persisted as JSON.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::{FeatureRow, Label, ReconciledDataset};
use crate::error::ModelError;

/// A trained model mapping feature rows to class labels
pub trait Classifier: Send + Sync {
    /// Predict one label per input row, in input order.
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<Label>, ModelError>;

    /// Labels the model can produce
    fn classes(&self) -> &[Label];
}

/// Decision tree training parameters
#[derive(Debug, Clone, Copy)]
pub struct TrainingParams {
    pub max_depth: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self { max_depth: 5 }
    }
}

/// Decision tree classifier with its label set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeModel {
    tree: DecisionTree<f64, usize>,
    classes: Vec<Label>,
}

impl DecisionTreeModel {
    /// Fit a tree on the features and `target` column of a dataset.
    pub fn train(dataset: &ReconciledDataset, params: TrainingParams) -> Result<Self, ModelError> {
        if dataset.is_empty() {
            return Err(ModelError::Training(
                "training dataset is empty".to_string(),
            ));
        }

        let classes: Vec<Label> = dataset
            .target()
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if let Some(negative) = classes.iter().find(|c| **c < 0) {
            return Err(ModelError::Training(format!(
                "class labels must be non-negative, found {negative}"
            )));
        }

        let columns: Vec<&[f64]> = dataset.features().map(|(_, values)| values).collect();
        let features = Array2::from_shape_fn((dataset.len(), columns.len()), |(row, col)| {
            columns[col][row]
        });
        let targets: Array1<usize> = dataset.target().iter().map(|&t| t as usize).collect();

        info!(
            "Training decision tree with {} samples, max depth {}",
            dataset.len(),
            params.max_depth
        );

        let tree = DecisionTree::params()
            .max_depth(Some(params.max_depth))
            .fit(&Dataset::new(features, targets))
            .map_err(|e| ModelError::Training(e.to_string()))?;

        Ok(Self { tree, classes })
    }

    /// Load a model saved with [`DecisionTreeModel::save`].
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ModelError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let model: Self = serde_json::from_str(&content).map_err(|e| ModelError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(
            "Loaded decision tree from {} ({} classes)",
            path.display(),
            model.classes.len()
        );
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let save_err = |reason: String| ModelError::Save {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
        }
        let content = serde_json::to_string(self).map_err(|e| save_err(e.to_string()))?;
        fs::write(path, content).map_err(|e| save_err(e.to_string()))?;

        info!("Saved decision tree to {}", path.display());
        Ok(())
    }
}

impl Classifier for DecisionTreeModel {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<Label>, ModelError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let flat: Vec<f64> = rows.iter().flat_map(|r| r.values()).collect();
        let features = Array2::from_shape_vec((rows.len(), 4), flat)
            .map_err(|e| ModelError::Invocation(e.to_string()))?;

        let labels = self.tree.predict(&features);
        Ok(labels.iter().map(|&l| l as Label).collect())
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }
}
