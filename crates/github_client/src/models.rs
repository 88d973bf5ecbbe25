//! Domain models for GitHub API responses.
//!
//! Wire structs deserialize the GitHub REST payloads directly; the public
//! types carry only the fields the rest of the system actually consumes.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Repository metadata as used by validation, enrichment and the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub stars: u64,
    pub language: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    /// SPDX identifier of the declared license, if GitHub recognized one.
    pub license: Option<String>,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    /// Repository size in KiB.
    pub size: u64,
    pub default_branch: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub topics: Vec<String>,
    pub has_wiki: bool,
    pub has_pages: bool,
    pub has_discussions: bool,
    pub archived: bool,
    pub private: bool,
}

/// Raw `/repos/{owner}/{repo}` payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRepository {
    #[serde(default)]
    pub stargazers_count: u64,
    pub language: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<ApiLicense>,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub subscribers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default = "default_branch_name")]
    pub default_branch: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_pages: bool,
    #[serde(default)]
    pub has_discussions: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub private: bool,
}

fn default_branch_name() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLicense {
    pub spdx_id: Option<String>,
}

impl From<ApiRepository> for RepoMetadata {
    fn from(value: ApiRepository) -> Self {
        Self {
            stars: value.stargazers_count,
            language: value.language,
            description: value.description,
            homepage: value.homepage,
            license: value
                .license
                .and_then(|l| l.spdx_id)
                .filter(|id| id != "NOASSERTION"),
            forks: value.forks_count,
            watchers: value.subscribers_count,
            open_issues: value.open_issues_count,
            size: value.size,
            default_branch: value.default_branch,
            created_at: value.created_at,
            updated_at: value.updated_at,
            pushed_at: value.pushed_at,
            topics: value.topics,
            has_wiki: value.has_wiki,
            has_pages: value.has_pages,
            has_discussions: value.has_discussions,
            archived: value.archived,
            private: value.private,
        }
    }
}

/// A repository contributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default = "anonymous_login")]
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub contributions: u64,
}

fn anonymous_login() -> String {
    "anonymous".to_string()
}

/// How a project is installed, derived from its root manifest files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationMethod {
    /// Package manager kind: `npm`, `pip`, `cargo`, `go` or `git`.
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
}

/// Documentation links detected from the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog_url: Option<String>,
}

/// A repository owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRepo {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub language: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
}

/// The authenticated user behind a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
    pub name: Option<String>,
}

/// A created or located pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub html_url: String,
    pub number: u64,
}

/// An entry in a repository contents listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    /// `file`, `dir`, `symlink` or `submodule`.
    #[serde(rename = "type")]
    pub kind: String,
}

// Wire-only payloads.

#[derive(Debug, Deserialize)]
pub(crate) struct TopicsResponse {
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReadmeResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileContentResponse {
    pub content: Option<String>,
    pub sha: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitRefResponse {
    pub object: GitObject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitObject {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueItem {
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrgMembership {
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollaboratorPermission {
    pub permission: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepoOwner {
    pub login: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnedRepo {
    pub owner: RepoOwner,
}
