//! HTTP routing configuration.
//!
//! All routes are prefixed with `/api`:
//!
//! - GET       /api/health - Health check
//! - GET/POST  /api/visitors - Read / increment visitor count
//! - GET/POST  /api/hits - Read / increment hit count (rate limited)
//! - GET       /api/check-duplicate - Repository existence check
//! - GET       /api/validate-repo - Repository shape/accessibility check
//! - POST      /api/submit-project - Authenticated submission, opens a PR
//! - GET/POST  /api/star - Check / set a star with the caller's token
//! - GET       /api/user-repos - Authenticated user's public repositories
//! - POST      /api/webhook - GitHub push webhook
//! - POST      /api/ping-sitemap - Search engine sitemap pings
//! - GET       /api/admin/visitor-stats - Aggregate visitor statistics

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{handlers, middleware as api_middleware, AppState};

/// Create the complete API router with all routes configured.
///
/// This function sets up all endpoint routes, CORS, request tracing and
/// timeout handling. Authentication is per-endpoint (bearer token or admin
/// key read inside the handlers), so there is no router-wide auth layer.
pub fn create_router(state: AppState) -> Router {
    // Configure CORS for the browser clients
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-admin-api-key"),
        ])
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600));

    // Configure request tracing
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new())
        .on_response(DefaultOnResponse::new());

    // Configure request timeout (30 seconds)
    let timeout_layer = TimeoutLayer::new(Duration::from_secs(30));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/visitors",
            get(handlers::get_visitors).post(handlers::post_visitors),
        )
        .route("/hits", get(handlers::get_hits).post(handlers::post_hits))
        .route("/check-duplicate", get(handlers::check_duplicate))
        .route("/validate-repo", get(handlers::validate_repo))
        .route("/submit-project", post(handlers::submit_project))
        .route(
            "/star",
            get(handlers::check_star).post(handlers::star_project),
        )
        .route("/user-repos", get(handlers::user_repos))
        .route("/webhook", post(handlers::webhook))
        .route("/ping-sitemap", post(handlers::ping_sitemap))
        .route("/admin/visitor-stats", get(handlers::admin_visitor_stats))
        .layer(middleware::from_fn(api_middleware::tracing_middleware))
        .layer(timeout_layer)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state);

    // Root router with API prefix
    Router::new().nest("/api", api)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
