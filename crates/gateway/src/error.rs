//! Error types for the gateway layer

use reqwest::StatusCode;
use thiserror::Error;

use crate::validation::ValidationError;

/// Failure classes surfaced to callers of the [`ApiClient`](crate::ApiClient).
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend rejected the token; the session has already been cleared.
    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success status, e.g. 400, 409 or 422.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("could not reach the server: {0}")]
    Network(#[source] reqwest::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    pub(crate) fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden { message },
            404 => ApiError::NotFound { message },
            code @ 500..=599 => ApiError::ServerError {
                status: code,
                message,
            },
            code => ApiError::Rejected {
                status: code,
                message,
            },
        }
    }

    /// HTTP status behind the error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::ServerError { status, .. } | ApiError::Rejected { status, .. } => {
                Some(*status)
            }
            ApiError::Network(_)
            | ApiError::Validation(_)
            | ApiError::Decode(_)
            | ApiError::Client(_) => None,
        }
    }

    /// The server supplied or default message for status failures.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Forbidden { message }
            | ApiError::NotFound { message }
            | ApiError::ServerError { message, .. }
            | ApiError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;
