//! API Server Module
//!
//! This module contains the server setup functionality for the API system.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use iris_monitor_core::config::ServerConfig;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{drift_report, get_report, health_check, metrics, predict, ApiState};

/// Main API server
pub struct ApiServer {
    /// Server configuration
    config: ServerConfig,
    /// Shared state
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ServerConfig, state: Arc<ApiState>) -> Self {
        Self { config, state }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Start the API server
    pub async fn start(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting Iris Monitor API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Iris Monitor API server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start API server: {}", e))?;

        info!("Iris Monitor API server stopped");
        Ok(())
    }
}

/// Build the application router around the shared state
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Prediction
        .route("/predict", post(predict))
        // Monitoring
        .route("/monitoring/drift-report", get(drift_report))
        .route("/reports/:name", get(get_report))
        .route("/metrics", get(metrics))
        // Health check
        .route("/health", get(health_check))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Endpoint label for requests that reached no route
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Count every routed request and its latency, labelled by route template.
async fn track_requests(State(state): State<Arc<ApiState>>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());

    let started = Instant::now();
    let response = next.run(request).await;
    state
        .metrics
        .record_request(&method, &endpoint, started.elapsed().as_secs_f64());

    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
