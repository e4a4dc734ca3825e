//! Command-line entry points
//!
//! `serve` runs the HTTP service, `train` fits the classifier on the reference
//! dataset, `analyze` runs one drift analysis without the server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iris_monitor_api::{ApiServer, ApiState, DriftReportResponse};
use iris_monitor_core::{
    analysis::ClassificationScores,
    data::{load_csv, DatasetRole, ReconciledDataset, SchemaReconciler},
    Classifier, DecisionTreeModel, DriftAnalyzer, MonitoringMetrics, MonitoringService,
    PredictionStore, ReportArchive, Settings, TrainingParams,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "iris-monitor", version, about = "Iris prediction service with drift monitoring")]
pub struct Cli {
    /// Settings file (TOML); defaults to ./iris-monitor.toml when present
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP service
    Serve,
    /// Train the classifier on the reference dataset and save it
    Train {
        /// Maximum depth of the decision tree
        #[arg(long, default_value_t = TrainingParams::default().max_depth)]
        max_depth: usize,
    },
    /// Run one drift analysis and print the published scores as JSON
    Analyze,
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    Settings::load(path).context("Failed to load settings")
}

/// Load the model and serve until interrupted.
pub async fn serve(settings: Settings) -> Result<()> {
    let model_path = &settings.paths.model;
    let model = DecisionTreeModel::load(model_path)
        .with_context(|| format!("Cannot start without a model at {}", model_path.display()))?;
    let model: Arc<dyn Classifier> = Arc::new(model);

    let state = ApiState::from_settings(&settings, model).context("Failed to initialise services")?;
    ApiServer::new(settings.server.clone(), Arc::new(state))
        .start()
        .await
}

/// Fit the tree on the reference dataset and write it to the model path.
pub fn train(settings: &Settings, params: TrainingParams) -> Result<ClassificationScores> {
    let reference_path = &settings.paths.reference_data;
    let mut frame = load_csv(reference_path)
        .with_context(|| format!("Failed to read {}", reference_path.display()))?;
    SchemaReconciler::new().reconcile(DatasetRole::Reference, &mut frame)?;
    let dataset = ReconciledDataset::from_frame(DatasetRole::Reference, &frame)?;

    info!(rows = dataset.len(), max_depth = params.max_depth, "Training decision tree");
    let model = DecisionTreeModel::train(&dataset, params)?;

    let predicted = model.predict(&dataset.rows())?;
    let scores = ClassificationScores::compute(dataset.target(), &predicted)?;
    info!(
        "Training accuracy: {:.3}, F1: {:.3}",
        scores.accuracy, scores.f1
    );

    model.save(&settings.paths.model)?;
    Ok(scores)
}

/// One offline analysis cycle, archived like a served one.
pub fn analyze(settings: &Settings) -> Result<DriftReportResponse> {
    let paths = &settings.paths;
    let service = MonitoringService::new(
        &paths.reference_data,
        Arc::new(PredictionStore::new(&paths.prediction_log)),
        DriftAnalyzer::new(settings.analysis.clone()),
        ReportArchive::new(&paths.reports_dir),
        Arc::new(MonitoringMetrics::new()?),
    );

    let outcome = service.run_drift_report()?;
    Ok(DriftReportResponse::from(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_defaults_and_global_config() {
        let cli = Cli::try_parse_from(["iris-monitor", "train", "--config", "custom.toml"])
            .expect("valid arguments");
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Command::Train { max_depth } => assert_eq!(max_depth, 5),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
