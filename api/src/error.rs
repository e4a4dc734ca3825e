//! HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use iris_monitor_core::MonitorError;
use tokio::task::JoinError;

use crate::models::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body failed to parse or validate
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MonitorError> for ApiError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::NotFound(message) => ApiError::NotFound(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "{}", self);
        } else {
            tracing::debug!(%status, "{}", self);
        }

        (status, Json(ErrorResponse { detail: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_monitor_core::SchemaError;

    #[test]
    fn test_monitor_errors_map_to_status() {
        let not_found: ApiError = MonitorError::NotFound("No reports available".to_string()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "No reports available");

        let schema: ApiError = MonitorError::Schema(SchemaError::MissingColumns {
            dataset: "reference".to_string(),
            columns: vec!["petal_width_cm".to_string()],
        })
        .into();
        assert_eq!(schema.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(schema.to_string().contains("petal_width_cm"));
    }
}
