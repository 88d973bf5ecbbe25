//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when interacting with
//! the GitHub API through the github_client crate, together with the mapping
//! from octocrab transport errors onto the status-specific variants the rest
//! of the system keys its behavior on.

use http::StatusCode;
use tracing::error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authentication or GitHub client initialization failure.
    ///
    /// The contained string provides specific details about the failure.
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// A GitHub API request failed for a reason other than the specific
    /// variants below.
    #[error("GitHub API request failed: {0}")]
    Api(String),

    /// The requested resource does not exist or is not visible with the
    /// current credentials (HTTP 404).
    #[error("Resource not found")]
    NotFound,

    /// The credentials are valid but lack access to the resource (HTTP 403).
    #[error("Permission denied")]
    PermissionDenied,

    /// GitHub rejected the request as semantically invalid (HTTP 422).
    #[error("GitHub rejected the request: {0}")]
    Rejected(String),

    /// GitHub API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Error deserializing a response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The GitHub API returned a response in an unexpected format.
    #[error("Invalid response format")]
    InvalidResponse,
}

/// Extracts the HTTP status of a GitHub-reported error, if there is one.
pub(crate) fn error_status(error: &octocrab::Error) -> Option<StatusCode> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

/// Logs an octocrab failure and converts it into the matching [`Error`]
/// variant. 403 responses that mention the rate limit become
/// [`Error::RateLimitExceeded`] rather than [`Error::PermissionDenied`].
pub(crate) fn classify_error(message: &str, e: octocrab::Error) -> Error {
    match &e {
        octocrab::Error::GitHub { source, .. } => {
            error!(
                error_message = %source.message,
                status = %source.status_code,
                "{}. Received an error from GitHub",
                message
            );
            match source.status_code {
                StatusCode::UNAUTHORIZED => Error::AuthError(source.message.clone()),
                StatusCode::FORBIDDEN => {
                    if source.message.to_lowercase().contains("rate limit") {
                        Error::RateLimitExceeded
                    } else {
                        Error::PermissionDenied
                    }
                }
                StatusCode::NOT_FOUND => Error::NotFound,
                StatusCode::UNPROCESSABLE_ENTITY => Error::Rejected(source.message.clone()),
                _ => Error::Api(source.message.clone()),
            }
        }
        _ => {
            error!(error_message = %e, "{}", message);
            Error::Api(e.to_string())
        }
    }
}
