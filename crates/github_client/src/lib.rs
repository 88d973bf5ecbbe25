//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for the read operations the directory needs
//! (repository metadata, topics, README badge, issue counts, contributors,
//! starring, affiliation checks) and the publisher that proposes a new
//! project record as a pull request against the data repository.
//!
//! Authentication is token-based: either the service token from the
//! environment or the submitting user's OAuth token. Most endpoints are
//! called through octocrab's raw REST methods with typed models, because the
//! high-level builders do not cover them.

use std::collections::BTreeMap;

use base64::Engine;
use http::StatusCode;
use octocrab::{Octocrab, Result as OctocrabResult};
use tracing::{debug, info, instrument, warn};

pub mod errors;
pub use errors::Error;

pub mod models;
pub use models::{
    AuthenticatedUser, ContentEntry, Contributor, DocumentationLinks, InstallationMethod,
    PullRequest, RepoMetadata, UserRepo,
};

pub mod publisher;
pub use publisher::{
    publish_branch_name, LogoUpload, ProjectPublication, ProjectPublisher, PublishError,
    PublishStep, UpstreamRepo,
};

use errors::{classify_error, error_status};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The repository topic that marks a project as participating in the
/// directory.
pub const DIRECTORY_TOPIC: &str = "fossradar";

/// Marker the verified README badge must carry (matched case-insensitively).
const VERIFIED_BADGE_MARKER: &str = "img.shields.io/badge/fossradar.in-verified";

/// A client for interacting with the GitHub API.
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Wraps an already-built `Octocrab` instance.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Creates a client authenticated with a personal or OAuth access token.
    ///
    /// # Errors
    /// Returns an `Error::AuthError` if the underlying client cannot be built.
    pub fn from_token(token: &str) -> Result<Self, Error> {
        Ok(Self::new(create_token_client(token)?))
    }

    /// Creates an unauthenticated client for public reads.
    ///
    /// # Errors
    /// Returns an `Error::AuthError` if the underlying client cannot be built.
    pub fn anonymous() -> Result<Self, Error> {
        let client = Octocrab::builder()
            .build()
            .map_err(|e| Error::AuthError(format!("Failed to build GitHub client: {}", e)))?;
        Ok(Self::new(client))
    }

    pub(crate) fn inner(&self) -> &Octocrab {
        &self.client
    }

    /// Fetches metadata for a repository.
    ///
    /// # Arguments
    ///
    /// * `owner` - The owner of the repository (user or organization name).
    /// * `repo` - The name of the repository.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for missing or invisible repositories, or
    /// another status-mapped variant for other API failures.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepoMetadata, Error> {
        let path = format!("/repos/{}/{}", owner, repo);
        let result: OctocrabResult<models::ApiRepository> =
            self.client.get(path, None::<&()>).await;
        match result {
            Ok(raw) => Ok(RepoMetadata::from(raw)),
            Err(e) => Err(classify_error("Failed to get repository", e)),
        }
    }

    /// Whether the repository exists and is public.
    ///
    /// Any API failure reads as "not accessible"; callers use this as a
    /// yes/no gate, not as a diagnostic.
    pub async fn is_repo_accessible(&self, owner: &str, repo: &str) -> bool {
        match self.get_repository(owner, repo).await {
            Ok(meta) => !meta.private,
            Err(_) => false,
        }
    }

    /// Whether the repository carries the given topic (case-insensitive,
    /// exact match).
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, topic = %topic))]
    pub async fn has_topic(&self, owner: &str, repo: &str, topic: &str) -> Result<bool, Error> {
        let path = format!("/repos/{}/{}/topics", owner, repo);
        let result: OctocrabResult<models::TopicsResponse> =
            self.client.get(path, None::<&()>).await;
        match result {
            Ok(topics) => Ok(topics
                .names
                .iter()
                .any(|name| name.eq_ignore_ascii_case(topic))),
            Err(e) => Err(classify_error("Failed to list repository topics", e)),
        }
    }

    /// Fetches the repository README, decoded to text.
    ///
    /// Returns `Ok(None)` when the repository has no README.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn get_readme(&self, owner: &str, repo: &str) -> Result<Option<String>, Error> {
        let path = format!("/repos/{}/{}/readme", owner, repo);
        let result: OctocrabResult<models::ReadmeResponse> =
            self.client.get(path, None::<&()>).await;
        match result {
            Ok(readme) => Ok(Some(decode_base64_content(&readme.content)?)),
            Err(e) => match error_status(&e) {
                Some(StatusCode::NOT_FOUND) => Ok(None),
                _ => Err(classify_error("Failed to fetch README", e)),
            },
        }
    }

    /// Whether the README carries the directory's verified badge.
    pub async fn has_verified_badge(&self, owner: &str, repo: &str) -> Result<bool, Error> {
        let readme = self.get_readme(owner, repo).await?;
        Ok(readme
            .map(|text| text.to_lowercase().contains(VERIFIED_BADGE_MARKER))
            .unwrap_or(false))
    }

    /// Counts open issues labelled `good first issue`, excluding pull
    /// requests (the issues endpoint returns both).
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn count_good_first_issues(&self, owner: &str, repo: &str) -> Result<u32, Error> {
        let path = format!("/repos/{}/{}/issues", owner, repo);
        let params = [
            ("labels", "good first issue"),
            ("state", "open"),
            ("per_page", "100"),
        ];
        let result: OctocrabResult<Vec<models::IssueItem>> =
            self.client.get(path, Some(&params)).await;
        match result {
            Ok(issues) => Ok(issues
                .iter()
                .filter(|issue| issue.pull_request.is_none())
                .count() as u32),
            Err(e) => Err(classify_error("Failed to count good first issues", e)),
        }
    }

    /// Lists the top contributors of a repository.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
        limit: u8,
    ) -> Result<Vec<Contributor>, Error> {
        let path = format!("/repos/{}/{}/contributors", owner, repo);
        let per_page = limit.to_string();
        let params = [("per_page", per_page.as_str())];
        let result: OctocrabResult<Vec<Contributor>> = self.client.get(path, Some(&params)).await;
        match result {
            Ok(contributors) => Ok(contributors),
            Err(e) => Err(classify_error("Failed to list contributors", e)),
        }
    }

    /// Byte counts per language, as reported by GitHub.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn language_breakdown(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<BTreeMap<String, u64>, Error> {
        let path = format!("/repos/{}/{}/languages", owner, repo);
        let result: OctocrabResult<BTreeMap<String, u64>> =
            self.client.get(path, None::<&()>).await;
        match result {
            Ok(languages) => Ok(languages),
            Err(e) => Err(classify_error("Failed to fetch language breakdown", e)),
        }
    }

    /// Lists the entries at the repository root.
    async fn list_root_contents(&self, owner: &str, repo: &str) -> Result<Vec<ContentEntry>, Error> {
        let path = format!("/repos/{}/{}/contents/", owner, repo);
        let result: OctocrabResult<Vec<ContentEntry>> = self.client.get(path, None::<&()>).await;
        match result {
            Ok(entries) => Ok(entries),
            Err(e) => Err(classify_error("Failed to list repository contents", e)),
        }
    }

    /// Derives an installation command from the manifest files at the
    /// repository root. Falls back to `git clone` when nothing recognizable
    /// is present.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn detect_installation(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<InstallationMethod, Error> {
        let entries = self.list_root_contents(owner, repo).await?;
        let files: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();

        if files.contains(&"package.json") {
            if let Some(package_name) = self.npm_package_name(owner, repo).await {
                return Ok(InstallationMethod {
                    kind: "npm".to_string(),
                    command: format!("npm install {}", package_name),
                });
            }
        }

        if files.contains(&"setup.py")
            || files.contains(&"pyproject.toml")
            || files.contains(&"requirements.txt")
        {
            return Ok(InstallationMethod {
                kind: "pip".to_string(),
                command: format!("pip install {}", repo),
            });
        }

        if files.contains(&"Cargo.toml") {
            return Ok(InstallationMethod {
                kind: "cargo".to_string(),
                command: format!("cargo install {}", repo),
            });
        }

        if files.contains(&"go.mod") {
            return Ok(InstallationMethod {
                kind: "go".to_string(),
                command: format!("go install github.com/{}/{}@latest", owner, repo),
            });
        }

        Ok(InstallationMethod {
            kind: "git".to_string(),
            command: format!("git clone https://github.com/{}/{}", owner, repo),
        })
    }

    /// Reads `package.json` and extracts its `name`, if parseable.
    async fn npm_package_name(&self, owner: &str, repo: &str) -> Option<String> {
        let path = format!("/repos/{}/{}/contents/package.json", owner, repo);
        let result: OctocrabResult<models::FileContentResponse> =
            self.client.get(path, None::<&()>).await;

        let content = result.ok()?.content?;
        let decoded = decode_base64_content(&content).ok()?;
        let parsed: serde_json::Value = serde_json::from_str(&decoded).ok()?;
        parsed
            .get("name")
            .and_then(|name| name.as_str())
            .map(str::to_string)
    }

    /// Looks for a docs directory and a CHANGELOG file at the repository
    /// root and returns browse links for whichever exist.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn find_documentation(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<DocumentationLinks, Error> {
        let entries = self.list_root_contents(owner, repo).await?;
        let mut links = DocumentationLinks::default();

        let docs_dir = entries.iter().find(|entry| {
            entry.kind == "dir"
                && (entry.name.eq_ignore_ascii_case("docs")
                    || entry.name.eq_ignore_ascii_case("documentation"))
        });
        if let Some(dir) = docs_dir {
            links.docs_url = Some(format!(
                "https://github.com/{}/{}/tree/main/{}",
                owner, repo, dir.name
            ));
        }

        let changelog = entries.iter().find(|entry| {
            entry.kind == "file" && entry.name.to_lowercase().starts_with("changelog")
        });
        if let Some(file) = changelog {
            links.changelog_url = Some(format!(
                "https://github.com/{}/{}/blob/main/{}",
                owner, repo, file.name
            ));
        }

        Ok(links)
    }

    /// Stars a repository on behalf of the authenticated user.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn star_repository(&self, owner: &str, repo: &str) -> Result<(), Error> {
        let path = format!("/user/starred/{}/{}", owner, repo);
        match self.client._put(path, None::<&()>).await {
            Ok(response) if response.status().is_success() => {
                info!(owner = owner, repo = repo, "Starred repository");
                Ok(())
            }
            Ok(response) => Err(status_to_error(response.status())),
            Err(e) => Err(classify_error("Failed to star repository", e)),
        }
    }

    /// Whether the authenticated user has starred the repository.
    ///
    /// A 404 from the check endpoint means "not starred", not an error.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn is_starred(&self, owner: &str, repo: &str) -> Result<bool, Error> {
        let path = format!("/user/starred/{}/{}", owner, repo);
        match self.client._get(path).await {
            Ok(response) => match response.status() {
                StatusCode::NO_CONTENT => Ok(true),
                StatusCode::NOT_FOUND => Ok(false),
                status => Err(status_to_error(status)),
            },
            Err(e) => match error_status(&e) {
                Some(StatusCode::NOT_FOUND) => Ok(false),
                _ => Err(classify_error("Failed to check star state", e)),
            },
        }
    }

    /// Lists the authenticated user's public, non-fork repositories.
    #[instrument(skip(self))]
    pub async fn list_user_repositories(&self) -> Result<Vec<UserRepo>, Error> {
        let params = [
            ("sort", "updated"),
            ("per_page", "100"),
            ("type", "public"),
        ];
        let result: OctocrabResult<Vec<UserRepo>> =
            self.client.get("/user/repos", Some(&params)).await;
        match result {
            Ok(repos) => Ok(repos
                .into_iter()
                .filter(|repo| !repo.private && !repo.fork)
                .collect()),
            Err(e) => Err(classify_error("Failed to list user repositories", e)),
        }
    }

    /// Resolves the user behind the client's token.
    #[instrument(skip(self))]
    pub async fn get_authenticated_user(&self) -> Result<AuthenticatedUser, Error> {
        let result: OctocrabResult<AuthenticatedUser> = self.client.get("/user", None::<&()>).await;
        match result {
            Ok(user) => Ok(user),
            Err(e) => Err(classify_error("Failed to resolve authenticated user", e)),
        }
    }

    /// Whether `username` owns the repository, comparing case-insensitively.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, username = %username))]
    pub async fn is_repo_owner(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<bool, Error> {
        let path = format!("/repos/{}/{}", owner, repo);
        let result: OctocrabResult<models::OwnedRepo> = self.client.get(path, None::<&()>).await;
        match result {
            Ok(data) => Ok(data.owner.login.eq_ignore_ascii_case(username)),
            Err(e) => Err(classify_error("Failed to resolve repository owner", e)),
        }
    }

    /// Whether the repository is owned by an organization.
    pub async fn is_org_owned(&self, owner: &str, repo: &str) -> Result<bool, Error> {
        let path = format!("/repos/{}/{}", owner, repo);
        let result: OctocrabResult<models::OwnedRepo> = self.client.get(path, None::<&()>).await;
        match result {
            Ok(data) => Ok(data.owner.kind == "Organization"),
            Err(e) => Err(classify_error("Failed to resolve repository owner", e)),
        }
    }

    /// Whether `username` is an active member of the organization.
    #[instrument(skip(self), fields(org = %org, username = %username))]
    pub async fn is_org_member(&self, org: &str, username: &str) -> Result<bool, Error> {
        let path = format!("/orgs/{}/memberships/{}", org, username);
        let result: OctocrabResult<models::OrgMembership> =
            self.client.get(path, None::<&()>).await;
        match result {
            Ok(membership) => Ok(membership.state == "active"),
            Err(e) => match error_status(&e) {
                Some(StatusCode::NOT_FOUND) => Ok(false),
                _ => Err(classify_error("Failed to check organization membership", e)),
            },
        }
    }

    /// Whether `username` has write access or better on the repository.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, username = %username))]
    pub async fn has_write_access(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<bool, Error> {
        let path = format!(
            "/repos/{}/{}/collaborators/{}/permission",
            owner, repo, username
        );
        let result: OctocrabResult<models::CollaboratorPermission> =
            self.client.get(path, None::<&()>).await;
        match result {
            Ok(data) => Ok(matches!(
                data.permission.as_str(),
                "admin" | "write" | "maintain"
            )),
            Err(e) => match error_status(&e) {
                Some(StatusCode::NOT_FOUND) => Ok(false),
                _ => Err(classify_error("Failed to check collaborator permission", e)),
            },
        }
    }

    /// Whether `username` appears in the repository's contributor list.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, username = %username))]
    pub async fn has_contributed(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<bool, Error> {
        let contributors = self.list_contributors(owner, repo, 100).await?;
        Ok(contributors
            .iter()
            .any(|c| c.login.eq_ignore_ascii_case(username)))
    }

    /// Reads the head commit SHA of a branch.
    pub(crate) async fn branch_head_sha(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<String, Error> {
        let path = format!("/repos/{}/{}/git/ref/heads/{}", owner, repo, branch);
        let result: OctocrabResult<models::GitRefResponse> =
            self.client.get(path, None::<&()>).await;
        match result {
            Ok(reference) => Ok(reference.object.sha),
            Err(e) => Err(classify_error("Failed to read branch head", e)),
        }
    }

    /// Reads the blob SHA of a file on a branch, if the file exists there.
    pub(crate) async fn file_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<String>, Error> {
        let route = format!("/repos/{}/{}/contents/{}", owner, repo, path);
        let params = [("ref", branch)];
        let result: OctocrabResult<models::FileContentResponse> =
            self.client.get(route, Some(&params)).await;
        match result {
            Ok(file) => Ok(file.sha),
            Err(e) => match error_status(&e) {
                Some(StatusCode::NOT_FOUND) => Ok(None),
                _ => Err(classify_error("Failed to read file metadata", e)),
            },
        }
    }
}

/// Maps an HTTP status that arrived outside octocrab's error channel onto
/// the matching [`Error`] variant.
fn status_to_error(status: StatusCode) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::AuthError("Token was rejected".to_string()),
        StatusCode::FORBIDDEN => Error::PermissionDenied,
        StatusCode::NOT_FOUND => Error::NotFound,
        StatusCode::UNPROCESSABLE_ENTITY => Error::Rejected(status.to_string()),
        other => Error::Api(format!("Unexpected status {}", other)),
    }
}

/// Decodes GitHub's newline-wrapped base64 file content.
fn decode_base64_content(content: &str) -> Result<String, Error> {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| {
            warn!(error = %e, "Failed to decode base64 content");
            Error::InvalidResponse
        })?;
    String::from_utf8(bytes).map_err(|e| {
        warn!(error = %e, "File content was not valid UTF-8");
        Error::InvalidResponse
    })
}

/// Creates an `Octocrab` client authenticated with a personal or OAuth
/// access token.
#[instrument(skip(token))]
pub fn create_token_client(token: &str) -> Result<Octocrab, Error> {
    debug!("Building token-authenticated GitHub client");
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| Error::AuthError(format!("Failed to build GitHub client: {}", e)))
}
