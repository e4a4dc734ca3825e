//! Prediction Store
//!
//! Append-only CSV log of scored rows; the only source of current data for
//! drift analysis. Appends from this process are serialised; other processes
//! writing the same file are not coordinated with.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use polars::prelude::*;
use tracing::{debug, error};

use crate::data::{
    load_csv, PredictionRecord, PETAL_LENGTH, PETAL_WIDTH, PREDICTION, SEPAL_LENGTH, SEPAL_WIDTH,
    TARGET,
};
use crate::error::{MonitorError, Result};

#[derive(Debug)]
pub struct PredictionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PredictionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persistence_error(&self, reason: impl ToString) -> MonitorError {
        MonitorError::Persistence {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// Append one record, writing the header first if the log is new.
    pub fn append(&self, record: &PredictionRecord) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| self.persistence_error("prediction log lock poisoned"))?;

        let result = self.append_locked(record);
        if let Err(e) = &result {
            error!("Error saving prediction data: {}", e);
        }
        result
    }

    fn append_locked(&self, record: &PredictionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.persistence_error(e))?;
        let needs_header = file
            .metadata()
            .map_err(|e| self.persistence_error(e))?
            .len()
            == 0;

        let features = &record.features;
        let mut row = df!(
            SEPAL_LENGTH => [features.sepal_length_cm],
            SEPAL_WIDTH => [features.sepal_width_cm],
            PETAL_LENGTH => [features.petal_length_cm],
            PETAL_WIDTH => [features.petal_width_cm],
            PREDICTION => [record.prediction],
            TARGET => [record.target]
        )
        .map_err(|e| self.persistence_error(e))?;

        CsvWriter::new(&mut file)
            .include_header(needs_header)
            .finish(&mut row)
            .map_err(|e| self.persistence_error(e))?;

        debug!(?record, "Prediction saved");
        Ok(())
    }

    /// Read the whole log. A missing or empty file yields an empty frame.
    pub fn load(&self) -> Result<DataFrame> {
        let is_empty = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if is_empty {
            return Ok(DataFrame::empty());
        }
        load_csv(&self.path)
    }

    /// Number of logged predictions
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DatasetRole, FeatureRow, ReconciledDataset};
    use tempfile::TempDir;

    #[test]
    fn test_append_writes_header_once() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = PredictionStore::new(dir.path().join("model").join("predictions_log.csv"));

        store
            .append(&PredictionRecord::provisional(FeatureRow::new(5.1, 3.5, 1.4, 0.2), 0))
            .expect("first append");
        store
            .append(&PredictionRecord::provisional(FeatureRow::new(6.3, 3.3, 6.0, 2.5), 2))
            .expect("second append");

        let content = fs::read_to_string(store.path()).expect("read log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "sepal_length_cm,sepal_width_cm,petal_length_cm,petal_width_cm,prediction,target"
        );
        assert_eq!(store.count().expect("count"), 2);
    }

    #[test]
    fn test_load_round_trips_labels() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = PredictionStore::new(dir.path().join("predictions_log.csv"));
        for label in [0, 1, 2, 1] {
            store
                .append(&PredictionRecord::provisional(
                    FeatureRow::new(5.0, 3.0, 4.0, 1.0),
                    label,
                ))
                .expect("append");
        }

        let frame = store.load().expect("load");
        let dataset =
            ReconciledDataset::from_frame(DatasetRole::Current, &frame).expect("materialise");
        assert_eq!(dataset.prediction(), &[0, 1, 2, 1]);
        assert_eq!(dataset.target(), dataset.prediction());
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = PredictionStore::new(dir.path().join("absent.csv"));
        assert_eq!(store.count().expect("count"), 0);
    }
}
