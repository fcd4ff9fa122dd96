//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Validation failures and the "last address" rule are not errors at this
//! level: they render a dialog inside the form fragment instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use customer_registry_core::{FormError, ListError, StoreError, SubmitError};
use thiserror::Error;

/// Application-level error type for the registry.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading or writing the customer store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<ListError> for AppError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::NotFound(id) => Self::NotFound(format!("customer {id}")),
            ListError::Store(e) => Self::Store(e),
        }
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::NotFound(id) => Self::NotFound(format!("customer {id}")),
            FormError::NoSuchAddress(index) => {
                Self::NotFound(format!("address {}", index.saturating_add(1)))
            }
            FormError::LastAddress => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(report) => Self::BadRequest(report.message()),
            SubmitError::NotFound(id) => Self::NotFound(format!("customer {id}")),
            SubmitError::Store(e) => Self::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Store(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
