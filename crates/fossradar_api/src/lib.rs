//! FOSSRadar REST API
//!
//! This crate provides the HTTP JSON API for the FOSSRadar directory: the
//! visitor and hit counters, duplicate and repository validation checks, the
//! authenticated submission endpoint that opens a pull request, starring,
//! the push webhook, and the admin statistics endpoint.
//!
//! This crate exists in the HTTP layer and handles request/response
//! translation, error mapping from domain to HTTP, routing, middleware and
//! server configuration. Business logic lives in `fossradar_core`; the
//! dependency flows HTTP API -> core, never the reverse.

use std::sync::Arc;
use std::time::Duration;

use fossradar_core::{HitsStore, VisitorStore};
use github_client::{GitHubClient, UpstreamRepo};
use project_store::{Allowlists, ProjectStore};

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod server;

// Re-export key types for convenience
pub use errors::{ApiError, ErrorResponse};
pub use models::{request, response};
pub use rate_limit::RateLimiter;
pub use server::{ApiConfig, ApiServer};

/// Default API port
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum accepted slug length on the counter endpoints.
pub const MAX_SLUG_LEN: usize = 100;

/// POST /api/hits allowance per client IP.
pub const HITS_RATE_LIMIT: u32 = 10;

/// Window for the hits allowance.
pub const HITS_WINDOW: Duration = Duration::from_secs(60);

/// Window within which repeat visits from one IP to one slug are not
/// counted again.
pub const VISITOR_DEDUP_WINDOW: Duration = Duration::from_secs(600);

/// Deploy-time service configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The data repository submissions open pull requests against.
    pub upstream: UpstreamRepo,

    /// Shared secret for webhook signature verification.
    pub webhook_secret: Option<String>,

    /// Static key guarding the admin endpoints. When unset, the admin
    /// endpoints are open (local development).
    pub admin_api_key: Option<String>,

    /// Absolute sitemap URL announced to search engines.
    pub sitemap_url: String,
}

/// Application state shared across handlers.
///
/// Built once in `main` from environment configuration. The visitor backend
/// is selected at configuration time and hidden behind the capability trait;
/// handlers never know which one they are talking to.
#[derive(Clone)]
pub struct AppState {
    pub store: ProjectStore,
    pub allowlists: Arc<Allowlists>,
    pub visitors: Arc<dyn VisitorStore>,
    pub hits: Arc<HitsStore>,
    /// Service-token (or anonymous) client for public reads. Submission and
    /// starring build per-request clients from the caller's token instead.
    pub github: Arc<GitHubClient>,
    pub http: reqwest::Client,
    pub hits_limiter: Arc<RateLimiter>,
    pub visitor_limiter: Arc<RateLimiter>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    /// Creates application state with the default per-instance throttles.
    pub fn new(
        store: ProjectStore,
        allowlists: Allowlists,
        visitors: Arc<dyn VisitorStore>,
        hits: HitsStore,
        github: GitHubClient,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            allowlists: Arc::new(allowlists),
            visitors,
            hits: Arc::new(hits),
            github: Arc::new(github),
            http: reqwest::Client::new(),
            hits_limiter: Arc::new(RateLimiter::new(HITS_RATE_LIMIT, HITS_WINDOW)),
            visitor_limiter: Arc::new(RateLimiter::new(1, VISITOR_DEDUP_WINDOW)),
            config: Arc::new(config),
        }
    }
}
