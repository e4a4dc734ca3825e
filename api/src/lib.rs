//! Iris Monitor API Module
//!
//! HTTP endpoints for scoring iris measurements, triggering drift analysis,
//! serving archived reports and exposing metrics to a scraper.

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use server::*;
