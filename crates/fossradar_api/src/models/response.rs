//! HTTP response models.

use serde::Serialize;

use fossradar_core::{SitemapPingResults, VisitorRecord, VisitorStatistics};
use github_client::{RepoMetadata, UserRepo};

/// GET /api/health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Visitor counter read/increment result.
#[derive(Debug, Serialize)]
pub struct VisitorCountResponse {
    pub slug: String,
    pub count: u64,
    /// Present on POST: whether this request was counted or deduplicated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counted: Option<bool>,
}

/// Hit counter read/increment result.
#[derive(Debug, Serialize)]
pub struct HitsResponse {
    pub slug: String,
    pub count: u64,
}

/// Catalog entry summary returned by the duplicate check.
#[derive(Debug, Serialize)]
pub struct DuplicateProject {
    pub slug: String,
    pub name: String,
}

/// GET /api/check-duplicate
#[derive(Debug, Serialize)]
pub struct DuplicateCheckResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<DuplicateProject>,
}

/// GET /api/validate-repo
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRepoResponse {
    pub valid: bool,
    pub metadata: RepoMetadata,
    pub has_fossradar_topic: bool,
}

/// POST /api/submit-project
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProjectResponse {
    pub pr_url: String,
    pub pr_number: u64,
    pub message: String,
}

/// GET/POST /api/star
#[derive(Debug, Serialize)]
pub struct StarResponse {
    pub starred: bool,
}

/// GET /api/user-repos
#[derive(Debug, Serialize)]
pub struct UserReposResponse {
    pub repos: Vec<UserRepo>,
}

/// POST /api/webhook
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    /// Whether the push changed project data and triggered refresh + pings.
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<SitemapPingResults>,
}

/// POST /api/ping-sitemap
#[derive(Debug, Serialize)]
pub struct PingSitemapResponse {
    pub results: SitemapPingResults,
}

/// GET /api/admin/visitor-stats
///
/// `supported: false` is the explicit degraded-mode answer when the
/// configured visitor backend cannot serve aggregates.
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<VisitorStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitors: Option<Vec<VisitorRecord>>,
}
