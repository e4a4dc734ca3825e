//! Iris Monitor CLI
//!
//! `serve` (HTTP service), `train` (fit and save the classifier) and
//! `analyze` (one offline drift report).

use anyhow::Result;
use clap::Parser;

use iris_monitor::cli::{self, Cli, Command};
use iris_monitor::logging;
use iris_monitor_core::TrainingParams;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings = cli::load_settings(args.config.as_deref())?;
    logging::init(&settings.logging)?;

    match args.command {
        Command::Serve => cli::serve(settings).await,
        Command::Train { max_depth } => {
            let scores = cli::train(&settings, TrainingParams { max_depth })?;
            println!("{}", serde_json::to_string_pretty(&scores)?);
            Ok(())
        }
        Command::Analyze => {
            let report = tokio::task::spawn_blocking(move || cli::analyze(&settings)).await??;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
