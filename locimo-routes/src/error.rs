use crate::routes::responses::ApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use error_stack::Report;
use locimo_core::result::{AuthError, StoreError};
use tracing::error;

#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("a document store operation failed: {0}")]
    Store(StoreError),
    #[error("a session operation failed: {0}")]
    Session(AuthError),
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ServiceError::Store(StoreError::PermissionDenied) => StatusCode::FORBIDDEN,
            ServiceError::Store(StoreError::Unavailable) => StatusCode::BAD_GATEWAY,
            ServiceError::Store(StoreError::InvalidRecord) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Session(AuthError::Unavailable) => StatusCode::BAD_GATEWAY,
            ServiceError::Session(AuthError::Logout) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ServiceError::Store(StoreError::NotFound) => "the requested record does not exist",
            ServiceError::Store(StoreError::PermissionDenied) => {
                "access to the requested records was denied"
            }
            ServiceError::Store(StoreError::Unavailable) => "the document store is unavailable",
            ServiceError::Store(StoreError::InvalidRecord) => "a stored record could not be read",
            ServiceError::Session(AuthError::Unavailable) => "the session provider is unavailable",
            ServiceError::Session(AuthError::Logout) => "the session could not be closed",
        }
    }
}

/// Error side of every endpoint. The report is logged in full, the caller only sees the
/// status and a short message.
#[derive(thiserror::Error)]
#[error("there was an error running the endpoint")]
pub struct EndpointError(Report<ServiceError>);

impl std::fmt::Debug for EndpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Report<ServiceError>> for EndpointError {
    fn from(value: Report<ServiceError>) -> Self {
        Self(value)
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        let context = *self.0.current_context();
        let status_code = context.status_code();
        if status_code.is_server_error() {
            error!("endpoint failed: {:?}", self.0);
        }

        ApiError::new(status_code, context.public_message()).into_response()
    }
}
