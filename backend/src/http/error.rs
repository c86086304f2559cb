//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::{ServiceError, ValidationError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (malformed IDs, unknown presets)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Workflow error (validation or store)
    Service(ServiceError),
}

fn repository_response(e: &RepositoryError) -> (StatusCode, ApiError) {
    let (status, code, message) = match e {
        RepositoryError::NotFound { message, .. } => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
        }
        RepositoryError::ValidationError { message, .. } => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
        }
        RepositoryError::DataIntegrityError { message, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATA_INTEGRITY_ERROR",
            message.clone(),
        ),
        RepositoryError::ConnectionError { message, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "CONNECTION_ERROR",
            message.clone(),
        ),
        RepositoryError::TimeoutError { message, .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT_ERROR", message.clone())
        }
        RepositoryError::ConfigurationError { message, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIGURATION_ERROR",
            message.clone(),
        ),
        RepositoryError::QueryError { message, .. }
        | RepositoryError::InternalError { message, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "REPOSITORY_ERROR",
            message.clone(),
        ),
    };
    (status, ApiError::new(code, message).with_details(e.context().to_string()))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Service(ServiceError::Repository(e)) => repository_response(&e),
            AppError::Service(e) => (
                StatusCode::BAD_REQUEST,
                ApiError::new(e.code(), e.to_string()),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code = %error.code, "{}", error.message);
        }

        (status, Json(error)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Service(err.into())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Service(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
