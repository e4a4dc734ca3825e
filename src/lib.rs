//! Iris Monitor: prediction service with drift monitoring
//!
//! The binary's command handlers and logging setup. The service itself lives
//! in `iris-monitor-core` and `iris-monitor-api`.

pub mod cli;
pub mod logging;

pub use cli::{Cli, Command};
