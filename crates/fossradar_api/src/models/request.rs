//! HTTP request models.

use serde::Deserialize;

use project_store::ProjectSubmission;

/// `?slug=` query on the counter endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SlugQuery {
    pub slug: Option<String>,
}

/// JSON body alternative to the slug query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct SlugBody {
    pub slug: Option<String>,
}

/// `?repoUrl=` query on the duplicate-check, repo-validation and star
/// endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoUrlQuery {
    pub repo_url: Option<String>,
}

/// A logo file accompanying a submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoFilePayload {
    pub filename: String,
    pub content_base64: String,
}

/// POST /api/submit-project body.
///
/// The record fields arrive flattened at the top level under their TOML
/// names; the logo and display name ride alongside.
#[derive(Debug, Deserialize)]
pub struct SubmitProjectRequest {
    #[serde(flatten)]
    pub submission: ProjectSubmission,
    #[serde(default, rename = "logoFile")]
    pub logo_file: Option<LogoFilePayload>,
    #[serde(default, rename = "submitterName")]
    pub submitter_name: Option<String>,
}

/// POST /api/star body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarRequest {
    pub repo_url: String,
}

/// GET /api/admin/visitor-stats query.
#[derive(Debug, Default, Deserialize)]
pub struct AdminStatsQuery {
    pub action: Option<String>,
    pub limit: Option<usize>,
}
