//! Schema Reconciler
//!
//! Aligns reference and current frames so both expose `target` and
//! `prediction`, and checks the feature columns before any statistics run.
//! Only the in-memory frames are touched.

use polars::prelude::*;
use tracing::{debug, error};

use super::dataset::has_column;
use super::{DatasetRole, FEATURE_COLUMNS, PREDICTION, TARGET};
use crate::error::{Result, SchemaError};

/// Which label column, if any, had to be derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelDerivation {
    None,
    TargetFromPrediction,
    PredictionFromTarget,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaReconciler;

impl SchemaReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile both datasets, reference first.
    pub fn reconcile_pair(&self, reference: &mut DataFrame, current: &mut DataFrame) -> Result<()> {
        self.reconcile(DatasetRole::Reference, reference)?;
        self.reconcile(DatasetRole::Current, current)?;
        Ok(())
    }

    /// Derive the missing label column, then verify the feature columns.
    pub fn reconcile(&self, role: DatasetRole, frame: &mut DataFrame) -> Result<LabelDerivation> {
        let derivation = match (has_column(frame, TARGET), has_column(frame, PREDICTION)) {
            (true, true) => LabelDerivation::None,
            (false, true) => {
                copy_column(frame, PREDICTION, TARGET)?;
                LabelDerivation::TargetFromPrediction
            }
            (true, false) => {
                copy_column(frame, TARGET, PREDICTION)?;
                LabelDerivation::PredictionFromTarget
            }
            (false, false) => {
                let err = SchemaError::MissingLabelColumns {
                    dataset: role.to_string(),
                };
                error!("{}", err);
                return Err(err.into());
            }
        };

        let missing: Vec<String> = FEATURE_COLUMNS
            .iter()
            .filter(|name| !has_column(frame, name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            let err = SchemaError::MissingColumns {
                dataset: role.to_string(),
                columns: missing,
            };
            error!("{}", err);
            return Err(err.into());
        }

        debug!(dataset = %role, ?derivation, "Schema reconciled");
        Ok(derivation)
    }
}

fn copy_column(frame: &mut DataFrame, from: &str, to: &str) -> Result<()> {
    let mut derived = frame.column(from)?.clone();
    derived.rename(to);
    frame.with_column(derived)?;
    Ok(())
}
