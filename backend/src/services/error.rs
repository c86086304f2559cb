//! Errors raised by the dashboard workflows.

use chrono::NaiveDate;

use super::validation::ValidationError;
use crate::db::repository::RepositoryError;

/// Failure of a workflow: bad operator input or a store problem.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl ServiceError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(e) => e.code(),
            ServiceError::Repository(e) => match e {
                RepositoryError::NotFound { .. } => "NOT_FOUND",
                RepositoryError::ValidationError { .. } => "VALIDATION_ERROR",
                RepositoryError::DataIntegrityError { .. } => "DATA_INTEGRITY_ERROR",
                RepositoryError::ConnectionError { .. } => "CONNECTION_ERROR",
                RepositoryError::TimeoutError { .. } => "TIMEOUT_ERROR",
                RepositoryError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
                RepositoryError::QueryError { .. } | RepositoryError::InternalError { .. } => {
                    "REPOSITORY_ERROR"
                }
            },
            ServiceError::InvalidRange { .. } => "INVALID_RANGE",
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
