use gatehouse_db::error::DbError;
use thiserror::Error;

use crate::auth::token::TokenError;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] gatehouse_core::error::CoreError),

    #[error(transparent)]
    TokenError(#[from] TokenError),

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl ServiceError {
    /// ## Summary
    /// Converts a storage error, reporting unique-key violations as `Conflict` with `message`.
    #[must_use]
    pub fn from_db_conflict(error: DbError, message: &str) -> Self {
        match error {
            DbError::UniqueViolation(constraint) => {
                tracing::debug!(%constraint, "Unique constraint rejected write");
                Self::Conflict(message.to_owned())
            }
            other => Self::DatabaseError(other),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
