//! services/api/src/error.rs
//!
//! Defines the error types for the API service: startup failures and the
//! request-level failure taxonomy surfaced to HTTP callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use cat_ratings_core::domain::DomainError;
use cat_ratings_core::ports::StoreError;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `api` service binaries.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a network
    /// socket or creating the storage directories).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure surfaced to an HTTP caller.
///
/// Every request-level error maps to exactly one status code and a JSON
/// `{"error": ...}` body. Authorization failures never reveal more than the
/// two top-level categories; storage failures never leak internal paths.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// No API key header was presented.
    #[error("Unauthorized: Missing API key")]
    ApiKeyMissing,

    /// An API key header was presented but did not match the secret.
    #[error("Forbidden: Invalid API key")]
    ApiKeyInvalid,

    /// The anti-forgery token was absent or did not match the session.
    #[error("Forbidden: Invalid CSRF token")]
    Csrf,

    /// A required request field was missing or unreadable.
    #[error("{0}")]
    Validation(String),

    /// The requested record (or any record at all) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The backing store could not be read or written. The detail is logged
    /// but never sent to the caller.
    #[error("internal server error")]
    Storage(String),
}

impl From<StoreError> for RequestError {
    fn from(err: StoreError) -> Self {
        let StoreError::Unavailable(detail) = err;
        RequestError::Storage(detail)
    }
}

impl From<DomainError> for RequestError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => RequestError::Validation(msg),
            DomainError::NotFound(_) => RequestError::NotFound(err.to_string()),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = match &self {
            RequestError::ApiKeyMissing => StatusCode::UNAUTHORIZED,
            RequestError::ApiKeyInvalid | RequestError::Csrf => StatusCode::FORBIDDEN,
            RequestError::Validation(_) => StatusCode::BAD_REQUEST,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::Storage(detail) => {
                error!("storage failure: {detail}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_taxonomy() {
        assert_eq!(
            RequestError::ApiKeyMissing.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RequestError::ApiKeyInvalid.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(RequestError::Csrf.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            RequestError::Validation("missing title".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::NotFound("no cat with id x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::Storage("disk full".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_detail_stays_out_of_the_message() {
        let err = RequestError::Storage("/var/data/db.json: permission denied".into());
        assert_eq!(err.to_string(), "internal server error");
    }
}
