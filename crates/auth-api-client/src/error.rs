//! API client error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Error type for auth backend calls.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned {status} ({body_summary})")]
    Status {
        status: StatusCode,
        body_summary: String,
    },

    /// An authenticated call was made with no session token persisted
    #[error("No session token stored")]
    MissingToken,

    /// Reading the bearer token failed
    #[error("Storage error: {0}")]
    Storage(#[from] secure_token_store::StorageError),

    /// Base URL or endpoint could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns true if retrying the same request might succeed.
    ///
    /// Transient errors include:
    /// - Connection failures and timeouts
    /// - 5xx responses
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                e.status().is_some_and(|status| status.is_server_error())
            }
            ApiError::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// Returns true if the server rejected the credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;
