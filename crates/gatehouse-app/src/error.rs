use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Writer, async_trait, writing::Json};
use thiserror::Error;

use gatehouse_service::error::ServiceError;

use crate::response::Envelope;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] gatehouse_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] gatehouse_core::error::CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// ## Summary
    /// HTTP status for this error. Anything not caused by the caller is a 500.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ServiceError(ServiceError::NotAuthenticated(_) | ServiceError::TokenError(_)) => {
                StatusCode::UNAUTHORIZED
            }
            Self::ServiceError(ServiceError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::ServiceError(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::ServiceError(ServiceError::Conflict(_)) => StatusCode::CONFLICT,
            Self::ServiceError(ServiceError::ValidationError(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal failures are not described.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::ServiceError(
                ServiceError::NotAuthenticated(msg)
                | ServiceError::Forbidden(msg)
                | ServiceError::ValidationError(msg)
                | ServiceError::Conflict(msg),
            )
            | Self::BadRequest(msg) => msg.clone(),
            Self::ServiceError(ServiceError::NotFound(what)) => format!("{what} not found"),
            Self::ServiceError(ServiceError::TokenError(_)) => {
                "invalid or expired token".to_owned()
            }
            _ => "internal server error".to_owned(),
        }
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, path = %req.uri().path(), "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        res.status_code(status);
        res.render(Json(Envelope::<()>::failure(self.public_message())));
    }
}
