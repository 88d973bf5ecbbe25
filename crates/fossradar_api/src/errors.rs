//! Error handling and HTTP error conversion.
//!
//! Domain errors from `fossradar_core`, `project_store` and `github_client`
//! are converted to HTTP responses at this boundary. Every error becomes the
//! same JSON envelope; handlers never panic and never leak an internal error
//! chain to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use fossradar_core::{HitsError, SubmissionError, VisitorError};
use project_store::{FieldIssue, StoreError};

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Standard error response for all API errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Additional context (optional, type varies by error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors, one variant per status class the handlers can produce.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more request fields violate the schema or an allowlist.
    #[error("Validation failed")]
    Validation(Vec<FieldIssue>),

    /// The request is malformed (missing or unusable parameter).
    #[error("{0}")]
    BadRequest(String),

    /// Missing or rejected credentials.
    #[error("{message}")]
    Unauthorized {
        message: String,
        /// Signals the client that re-authenticating with GitHub may help.
        requires_auth: bool,
    },

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with existing state (duplicate slug).
    #[error("{0}")]
    Conflict(String),

    /// The per-instance throttle rejected the request.
    #[error("Too many requests. Please try again later.")]
    RateLimited,

    /// An upstream service (GitHub) failed mid-operation.
    #[error("{0}")]
    Upstream(String),

    /// Something on our side failed.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            requires_auth: false,
        }
    }

    pub fn requires_auth(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            requires_auth: true,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::BadRequest(_) => "BadRequest",
            Self::Unauthorized { .. } => "Unauthorized",
            Self::NotFound(_) => "NotFound",
            Self::Conflict(_) => "Conflict",
            Self::RateLimited => "RateLimited",
            Self::Upstream(_) => "UpstreamError",
            Self::Internal(_) => "InternalError",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(issues) => serde_json::to_value(issues).ok(),
            Self::Unauthorized {
                requires_auth: true,
                ..
            } => Some(json!({ "requiresAuth": true })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server-side with a severity matching the status class.
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "API error");
        } else {
            tracing::warn!(status = %status, error = %self, "API error");
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        tracing::error!(error = %error, "Project store failure");
        Self::Internal("Failed to read the project catalog".to_string())
    }
}

impl From<VisitorError> for ApiError {
    fn from(error: VisitorError) -> Self {
        tracing::error!(error = %error, "Visitor store failure");
        Self::Internal("Failed to update visitor count".to_string())
    }
}

impl From<HitsError> for ApiError {
    fn from(error: HitsError) -> Self {
        tracing::error!(error = %error, "Hits store failure");
        Self::Internal("Failed to update hit count".to_string())
    }
}

impl From<SubmissionError> for ApiError {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Invalid(issues) => Self::Validation(issues),
            SubmissionError::DuplicateSlug(_) => Self::Conflict(error.to_string()),
            SubmissionError::Store(store) => store.into(),
            SubmissionError::Publish(publish) => {
                if publish.is_auth_failure() {
                    Self::requires_auth(publish.to_string())
                } else {
                    Self::Upstream(publish.to_string())
                }
            }
        }
    }
}

impl From<github_client::Error> for ApiError {
    fn from(error: github_client::Error) -> Self {
        match error {
            github_client::Error::AuthError(_) | github_client::Error::PermissionDenied => {
                Self::requires_auth(error.to_string())
            }
            github_client::Error::NotFound => Self::NotFound(error.to_string()),
            github_client::Error::RateLimitExceeded => Self::RateLimited,
            other => Self::Upstream(other.to_string()),
        }
    }
}
