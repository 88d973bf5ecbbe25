//! Request middleware and header extraction helpers.
//!
//! Authentication here is per-endpoint rather than a router-wide layer: only
//! the submission, starring and user-repository endpoints need the caller's
//! GitHub token, and they read it from the `Authorization` header through
//! [`bearer_token`]. The admin endpoints check a static key header instead.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::ServiceConfig;

#[cfg(test)]
#[path = "middleware_tests.rs"]
mod tests;

/// Request-tracing middleware.
///
/// Assigns each request a UUID, runs the handler inside a span carrying it,
/// and echoes it back in the `x-request-id` response header.
pub async fn tracing_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!("request", %request_id, %method, path = %path);
    let start = std::time::Instant::now();

    let mut response = next.run(request).instrument(span).await;

    info!(
        %request_id,
        %method,
        path = %path,
        status = %response.status(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Extracts the Bearer token from the `Authorization` header.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] (with `requiresAuth`) when the header
/// is absent or not a Bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::requires_auth("Authentication required. Please sign in with GitHub."))?;

    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(ApiError::requires_auth(
            "Invalid Authorization header. Expected: Bearer <token>",
        ));
    }

    Ok(parts[1].to_string())
}

/// Like [`bearer_token`], but absence is not an error.
pub fn optional_bearer_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).ok()
}

/// Best-effort client IP for the per-instance throttles.
///
/// Reads the proxy headers the deployment platform sets; an unidentifiable
/// client shares one bucket, which only makes the throttle stricter.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Enforces the `x-admin-api-key` header when an admin key is configured.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] on a missing or mismatched key.
pub fn require_admin_key(headers: &HeaderMap, config: &ServiceConfig) -> Result<(), ApiError> {
    let Some(expected) = &config.admin_api_key else {
        return Ok(());
    };

    let provided = headers
        .get("x-admin-api-key")
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected.as_str()) {
        return Err(ApiError::unauthorized("Invalid or missing admin API key"));
    }

    Ok(())
}
