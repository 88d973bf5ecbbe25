//! PR-author affiliation checks and the `verified` flag.
//!
//! A submission from someone affiliated with the project repository (owner,
//! organization member, collaborator with write access, or contributor) is
//! trusted enough to mark the record verified at merge time. Each check is a
//! separate best-effort API call; one failing read counts as "no" rather
//! than failing the whole verification.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, instrument, warn};

use github_client::GitHubClient;
use project_store::{parse_github_url, ProjectStore, StoreError};

#[cfg(test)]
#[path = "verify_author_tests.rs"]
mod tests;

/// Errors from the verification flow.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Invalid GitHub URL: {0}")]
    InvalidRepoUrl(String),

    #[error("Project \"{0}\" was not found in the catalog")]
    UnknownProject(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to update {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The four affiliation signals, each checked independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AffiliationCheck {
    pub is_owner: bool,
    pub is_org_member: bool,
    pub is_collaborator: bool,
    pub has_contributions: bool,
}

impl AffiliationCheck {
    /// Any single signal is enough.
    pub fn is_affiliated(&self) -> bool {
        self.is_owner || self.is_org_member || self.is_collaborator || self.has_contributions
    }

    /// Human-readable reasons for an affirmative result.
    pub fn reasons(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if self.is_owner {
            reasons.push("repository owner");
        }
        if self.is_org_member {
            reasons.push("organization member");
        }
        if self.is_collaborator {
            reasons.push("collaborator");
        }
        if self.has_contributions {
            reasons.push("contributor");
        }
        reasons
    }
}

/// Checks how `author` relates to the repository behind `repo_url`.
#[instrument(skip(client), fields(author = %author, repo_url = %repo_url))]
pub async fn check_affiliation(
    client: &GitHubClient,
    author: &str,
    repo_url: &str,
) -> Result<AffiliationCheck, VerifyError> {
    let Some((owner, repo)) = parse_github_url(repo_url) else {
        return Err(VerifyError::InvalidRepoUrl(repo_url.to_string()));
    };

    let mut check = AffiliationCheck::default();

    check.is_owner = client
        .is_repo_owner(&owner, &repo, author)
        .await
        .unwrap_or(false);

    let org_owned = client.is_org_owned(&owner, &repo).await.unwrap_or(false);
    if org_owned {
        check.is_org_member = client.is_org_member(&owner, author).await.unwrap_or(false);
    }

    check.is_collaborator = client
        .has_write_access(&owner, &repo, author)
        .await
        .unwrap_or(false);

    check.has_contributions = client
        .has_contributed(&owner, &repo, author)
        .await
        .unwrap_or(false);

    Ok(check)
}

fn verified_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^verified = (?:true|false)$").expect("valid regex"))
}

fn stars_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(stars = \d+)$").expect("valid regex"))
}

/// Flips the `verified` line of a record to `true`, inserting it after
/// `stars` when the record predates the field.
pub fn mark_verified(content: &str) -> String {
    if verified_line_regex().is_match(content) {
        verified_line_regex()
            .replace(content, "verified = true")
            .into_owned()
    } else {
        stars_line_regex()
            .replace(content, |caps: &regex::Captures<'_>| {
                format!("{}\nverified = true", &caps[1])
            })
            .into_owned()
    }
}

/// Checks the author's affiliation and, when affirmative, marks the record
/// verified on disk. Returns the check and whether the file was updated.
#[instrument(skip(client, store), fields(author = %author, slug = %slug))]
pub async fn verify_and_mark(
    client: &GitHubClient,
    store: &ProjectStore,
    author: &str,
    slug: &str,
) -> Result<(AffiliationCheck, bool), VerifyError> {
    let filename = format!("{}.toml", slug);
    let path = store.dir().join(&filename);
    if !path.exists() {
        return Err(VerifyError::UnknownProject(slug.to_string()));
    }

    let project = store.parse_file(&filename)?;
    let check = check_affiliation(client, author, &project.repo).await?;

    if !check.is_affiliated() {
        info!(author = author, slug = slug, "Author is not affiliated; record stays unverified");
        return Ok((check, false));
    }

    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| VerifyError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let updated = mark_verified(&content);
    let changed = updated != content;
    if changed {
        tokio::fs::write(&path, updated)
            .await
            .map_err(|source| VerifyError::Io {
                path: path.display().to_string(),
                source,
            })?;
        info!(slug = slug, reasons = ?check.reasons(), "Marked record as verified");
    } else {
        warn!(slug = slug, "Record was already verified");
    }

    Ok((check, changed))
}
