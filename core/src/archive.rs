//! Report Archive
//!
//! One HTML file per analysis run, named `model_drift_report_%Y%m%d_%H%M%S.html`.
//! Two runs within the same second overwrite each other. Because the timestamp
//! is fixed-width, lexicographic order of file names is chronological order.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::analysis::DriftReport;
use crate::error::{MonitorError, Result};

const REPORT_PREFIX: &str = "model_drift_report_";
const REPORT_EXTENSION: &str = ".html";

/// Directory of archived drift reports
#[derive(Debug, Clone)]
pub struct ReportArchive {
    dir: PathBuf,
}

impl ReportArchive {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// File name used for a report generated at `at`.
    pub fn file_name_for(at: &DateTime<Local>) -> String {
        format!(
            "{REPORT_PREFIX}{}{REPORT_EXTENSION}",
            at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the report's HTML and return the file path.
    pub fn save(&self, report: &DriftReport) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(Self::file_name_for(&report.generated_at));
        if path.exists() {
            warn!("Overwriting report generated in the same second: {}", path.display());
        }

        fs::write(&path, report.render_html()).map_err(|e| MonitorError::Persistence {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        info!("Report generated successfully at: {}", path.display());
        Ok(path)
    }

    /// Archived report file names, oldest first.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(REPORT_EXTENSION))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Path of the newest report.
    pub fn latest(&self) -> Result<PathBuf> {
        let latest = self
            .list()?
            .pop()
            .ok_or_else(|| MonitorError::NotFound("No reports available".to_string()))?;
        debug!("Latest report: {}", latest);
        Ok(self.dir.join(latest))
    }

    /// Resolve a report file name to a path inside the archive.
    ///
    /// Names carrying path separators or starting with a dot are refused.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let not_found = || MonitorError::NotFound(format!("Report '{name}' not found"));

        if name.is_empty() || name.starts_with('.') || name.contains(|c: char| c == '/' || c == '\\') {
            return Err(not_found());
        }
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(not_found());
        }
        Ok(path)
    }
}
