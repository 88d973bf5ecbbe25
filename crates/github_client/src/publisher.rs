//! Pull-request publication of new project records.
//!
//! The publish flow is a sequence of GitHub API calls — fork, branch, file
//! commit, optional logo commit, pull request — with no transaction around
//! them. Instead of pretending otherwise, the publisher tracks which steps
//! completed and derives the branch name from the submission content, so a
//! retry of the same submission resumes the previous attempt rather than
//! minting a fresh timestamped branch next to a dangling one.

use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::errors::{classify_error, error_status};
use crate::models::PullRequest;
use crate::{Error, GitHubClient};

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;

/// The data repository pull requests are opened against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRepo {
    pub owner: String,
    pub repo: String,
}

impl UpstreamRepo {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

/// A logo file accompanying a submission, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUpload {
    pub content_base64: String,
    pub filename: String,
}

/// Everything needed to publish one submission.
#[derive(Debug, Clone)]
pub struct ProjectPublication {
    pub slug: String,
    pub toml_content: String,
    pub submitter_name: Option<String>,
    pub logo: Option<LogoUpload>,
}

/// The individual steps of the publish sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStep {
    Fork,
    Branch,
    ProjectFile,
    LogoFile,
    PullRequest,
}

/// Publish failures, each carrying the steps that had already completed so a
/// caller (or operator) can tell how far the sequence got.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Repository not found. Please ensure you have access to create PRs.")]
    NotFound { steps: Vec<PublishStep> },

    #[error("Permission denied. Please ensure your GitHub account has the necessary permissions.")]
    PermissionDenied { steps: Vec<PublishStep> },

    #[error("GitHub authentication failed. Please sign in again.")]
    AuthFailed { steps: Vec<PublishStep> },

    #[error("Unable to create fork. Please try again or fork the repository manually.")]
    ForkFailed { steps: Vec<PublishStep> },

    #[error("GitHub rejected the submission: {message}")]
    Rejected {
        message: String,
        steps: Vec<PublishStep>,
    },

    #[error("GitHub API failure: {message}")]
    Upstream {
        message: String,
        steps: Vec<PublishStep>,
    },
}

impl PublishError {
    /// The steps that completed before the failure.
    pub fn completed_steps(&self) -> &[PublishStep] {
        match self {
            Self::NotFound { steps }
            | Self::PermissionDenied { steps }
            | Self::AuthFailed { steps }
            | Self::ForkFailed { steps }
            | Self::Rejected { steps, .. }
            | Self::Upstream { steps, .. } => steps,
        }
    }

    /// Whether the failure came from bad or expired credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthFailed { .. } | Self::PermissionDenied { .. }
        )
    }
}

/// Derives the idempotent branch name for a submission.
///
/// The suffix is the first ten hex characters of SHA-256 over the slug and
/// the rendered TOML, so identical retries map to the same branch and any
/// change to the content maps to a different one.
pub fn publish_branch_name(slug: &str, toml_content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(slug.as_bytes());
    hasher.update(b"\n");
    hasher.update(toml_content.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("add/{}-{}", slug, &digest[..10])
}

#[derive(Serialize)]
struct CreateRefRequest {
    #[serde(rename = "ref")]
    reference: String,
    sha: String,
}

#[derive(Serialize)]
struct PutFileRequest {
    message: String,
    content: String,
    branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Serialize)]
struct CreatePullRequest {
    title: String,
    head: String,
    base: String,
    body: String,
}

/// Publishes project submissions as pull requests against the upstream data
/// repository, acting as the submitting user.
#[derive(Debug)]
pub struct ProjectPublisher {
    client: GitHubClient,
    upstream: UpstreamRepo,
}

impl ProjectPublisher {
    /// Creates a publisher from the submitting user's client.
    pub fn new(client: GitHubClient, upstream: UpstreamRepo) -> Self {
        Self { client, upstream }
    }

    /// Runs the full publish sequence and returns the pull request.
    ///
    /// # Errors
    /// Returns a [`PublishError`] carrying the completed steps. A branch or
    /// pull request left over from an identical earlier attempt is resumed,
    /// not treated as a conflict.
    #[instrument(skip(self, publication), fields(slug = %publication.slug))]
    pub async fn publish(
        &self,
        publication: &ProjectPublication,
    ) -> Result<PullRequest, PublishError> {
        let mut steps: Vec<PublishStep> = Vec::new();

        let user = self
            .client
            .get_authenticated_user()
            .await
            .map_err(|e| map_error(e, &steps))?;
        info!(login = %user.login, "Publishing as authenticated user");

        let fork_owner = self.ensure_fork(&user.login, &mut steps).await?;

        let upstream_meta = self
            .client
            .get_repository(&self.upstream.owner, &self.upstream.repo)
            .await
            .map_err(|e| map_error(e, &steps))?;
        let base_branch = upstream_meta.default_branch;

        let head_sha = self
            .client
            .branch_head_sha(&self.upstream.owner, &self.upstream.repo, &base_branch)
            .await
            .map_err(|e| map_error(e, &steps))?;

        let branch = publish_branch_name(&publication.slug, &publication.toml_content);
        self.create_branch(&fork_owner, &branch, &head_sha, &mut steps)
            .await?;

        let file_path = format!("data/projects/{}.toml", publication.slug);
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(publication.toml_content.as_bytes());
        self.put_file(
            &fork_owner,
            &branch,
            &file_path,
            &format!("Add project: {}", publication.slug),
            &encoded,
            &steps,
        )
        .await?;
        steps.push(PublishStep::ProjectFile);

        if let Some(logo) = &publication.logo {
            let logo_path = format!("public/logos/{}/{}", publication.slug, logo.filename);
            self.put_file(
                &fork_owner,
                &branch,
                &logo_path,
                &format!("Add logo for project: {}", publication.slug),
                &logo.content_base64,
                &steps,
            )
            .await?;
            steps.push(PublishStep::LogoFile);
        }

        let pr = self
            .open_pull_request(publication, &user.login, &fork_owner, &branch, &base_branch, &steps)
            .await?;
        info!(number = pr.number, url = %pr.html_url, "Opened pull request");

        Ok(pr)
    }

    /// Finds the user's fork of the upstream repository, creating it when
    /// absent. Fork creation is asynchronous on GitHub's side, so a fresh
    /// fork is polled briefly until it answers.
    async fn ensure_fork(
        &self,
        login: &str,
        steps: &mut Vec<PublishStep>,
    ) -> Result<String, PublishError> {
        if login == self.upstream.owner {
            // The maintainer submitting to their own repository needs no fork.
            steps.push(PublishStep::Fork);
            return Ok(login.to_string());
        }

        if self
            .client
            .get_repository(login, &self.upstream.repo)
            .await
            .is_ok()
        {
            info!(login = login, repo = %self.upstream.repo, "Fork already exists");
            steps.push(PublishStep::Fork);
            return Ok(login.to_string());
        }

        info!(login = login, "Creating fork of upstream repository");
        let path = format!("/repos/{}/{}/forks", self.upstream.owner, self.upstream.repo);
        let result: octocrab::Result<serde_json::Value> =
            self.client.inner().post(path, None::<&()>).await;
        if let Err(e) = result {
            warn!(error = %e, "Fork creation request failed");
            return Err(PublishError::ForkFailed {
                steps: steps.clone(),
            });
        }

        for _attempt in 0..5 {
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            if self
                .client
                .get_repository(login, &self.upstream.repo)
                .await
                .is_ok()
            {
                steps.push(PublishStep::Fork);
                return Ok(login.to_string());
            }
        }

        warn!(login = login, "Fork did not become available in time");
        Err(PublishError::ForkFailed {
            steps: steps.clone(),
        })
    }

    /// Creates the submission branch in the fork. A branch left behind by an
    /// identical earlier attempt is reused.
    async fn create_branch(
        &self,
        fork_owner: &str,
        branch: &str,
        head_sha: &str,
        steps: &mut Vec<PublishStep>,
    ) -> Result<(), PublishError> {
        let path = format!("/repos/{}/{}/git/refs", fork_owner, self.upstream.repo);
        let body = CreateRefRequest {
            reference: format!("refs/heads/{}", branch),
            sha: head_sha.to_string(),
        };
        let result: octocrab::Result<serde_json::Value> =
            self.client.inner().post(path, Some(&body)).await;

        match result {
            Ok(_) => {
                steps.push(PublishStep::Branch);
                Ok(())
            }
            Err(e) if error_status(&e) == Some(http::StatusCode::UNPROCESSABLE_ENTITY) => {
                // Deterministic branch name: an existing branch is this same
                // submission from a previous attempt.
                info!(branch = branch, "Branch already exists, resuming previous attempt");
                steps.push(PublishStep::Branch);
                Ok(())
            }
            Err(e) => Err(map_error(
                classify_error("Failed to create branch", e),
                steps,
            )),
        }
    }

    /// Creates or updates a file on the submission branch.
    async fn put_file(
        &self,
        fork_owner: &str,
        branch: &str,
        path: &str,
        message: &str,
        content_base64: &str,
        steps: &[PublishStep],
    ) -> Result<(), PublishError> {
        // When resuming, the file may already exist on the branch; the
        // contents API then requires its current blob SHA.
        let existing_sha = self
            .client
            .file_sha(fork_owner, &self.upstream.repo, path, branch)
            .await
            .map_err(|e| map_error(e, steps))?;

        let route = format!("/repos/{}/{}/contents/{}", fork_owner, self.upstream.repo, path);
        let body = PutFileRequest {
            message: message.to_string(),
            content: content_base64.to_string(),
            branch: branch.to_string(),
            sha: existing_sha,
        };
        let result: octocrab::Result<serde_json::Value> =
            self.client.inner().put(route, Some(&body)).await;

        result
            .map(|_| ())
            .map_err(|e| map_error(classify_error("Failed to commit file", e), steps))
    }

    /// Opens the pull request, or returns the already-open one from a
    /// previous attempt with the same branch.
    async fn open_pull_request(
        &self,
        publication: &ProjectPublication,
        login: &str,
        fork_owner: &str,
        branch: &str,
        base_branch: &str,
        steps: &[PublishStep],
    ) -> Result<PullRequest, PublishError> {
        let head = if fork_owner == self.upstream.owner {
            branch.to_string()
        } else {
            format!("{}:{}", fork_owner, branch)
        };

        let path = format!("/repos/{}/{}/pulls", self.upstream.owner, self.upstream.repo);
        let body = CreatePullRequest {
            title: format!("Add project: {}", publication.slug),
            head: head.clone(),
            base: base_branch.to_string(),
            body: pull_request_body(publication, login),
        };
        let result: octocrab::Result<PullRequest> =
            self.client.inner().post(path, Some(&body)).await;

        match result {
            Ok(pr) => Ok(pr),
            Err(e) if error_status(&e) == Some(http::StatusCode::UNPROCESSABLE_ENTITY) => {
                if let Some(existing) = self.find_open_pull_request(fork_owner, branch).await {
                    info!(number = existing.number, "Pull request already open, resuming");
                    return Ok(existing);
                }
                Err(map_error(
                    classify_error("Failed to open pull request", e),
                    steps,
                ))
            }
            Err(e) => Err(map_error(
                classify_error("Failed to open pull request", e),
                steps,
            )),
        }
    }

    /// Looks for an open pull request from the given head branch.
    async fn find_open_pull_request(&self, fork_owner: &str, branch: &str) -> Option<PullRequest> {
        let path = format!("/repos/{}/{}/pulls", self.upstream.owner, self.upstream.repo);
        let head = format!("{}:{}", fork_owner, branch);
        let params = [("head", head.as_str()), ("state", "open")];
        let result: octocrab::Result<Vec<PullRequest>> =
            self.client.inner().get(path, Some(&params)).await;
        result.ok().and_then(|prs| prs.into_iter().next())
    }
}

/// Renders the pull request description shown to the reviewing maintainer.
fn pull_request_body(publication: &ProjectPublication, login: &str) -> String {
    let submitter = publication.submitter_name.as_deref().unwrap_or(login);
    let logo_line = match &publication.logo {
        Some(logo) => format!("**Logo:** Included ({})\n", logo.filename),
        None => "**Logo:** Not provided\n".to_string(),
    };
    let logo_checklist = if publication.logo.is_some() {
        "\n- [ ] Logo file is valid and optimized"
    } else {
        ""
    };

    format!(
        "## New Project Submission\n\n\
         **Slug:** {slug}\n\
         **Submitted by:** @{submitter}\n\
         {logo_line}\n\
         ### Checklist\n\
         - [ ] Repository has topic `fossradar`\n\
         - [ ] README includes verified badge (recommended)\n\
         - [ ] License is OSI-approved\n\
         - [ ] All required fields are filled{logo_checklist}\n\n\
         ---\n\
         *This PR was automatically generated via the FOSSRadar.in submission form.*",
        slug = publication.slug,
        submitter = submitter,
        logo_line = logo_line,
        logo_checklist = logo_checklist,
    )
}

/// Maps a client error onto a publish error, attaching the completed steps.
fn map_error(error: Error, steps: &[PublishStep]) -> PublishError {
    let steps = steps.to_vec();
    match error {
        Error::NotFound => PublishError::NotFound { steps },
        Error::PermissionDenied => PublishError::PermissionDenied { steps },
        Error::AuthError(_) => PublishError::AuthFailed { steps },
        Error::Rejected(message) => PublishError::Rejected { message, steps },
        other => PublishError::Upstream {
            message: other.to_string(),
            steps,
        },
    }
}
