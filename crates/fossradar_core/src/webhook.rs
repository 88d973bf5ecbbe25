//! GitHub push-webhook verification and payload filtering.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

type HmacSha256 = Hmac<Sha256>;

/// Commit paths under this prefix mean the project catalog changed.
pub const PROJECT_DATA_PREFIX: &str = "data/projects/";

/// The generated search index, rebuilt alongside the catalog.
pub const SEARCH_INDEX_PATH: &str = "public/index.json";

/// Verifies an `x-hub-signature-256` header against the raw request body.
///
/// The header carries `sha256=<hex digest>` where the digest is HMAC-SHA256
/// of the body under the shared webhook secret. Comparison is constant-time;
/// any malformed header fails verification rather than erroring.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &str) -> bool {
    let Some(hex_digest) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// File changes in one commit of a push payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushCommit {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

impl PushCommit {
    fn paths(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .chain(self.removed.iter())
            .map(String::as_str)
    }
}

/// The repository section of a push payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushRepository {
    pub default_branch: Option<String>,
}

/// A GitHub push event, reduced to the fields the webhook handler needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub repository: Option<PushRepository>,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

impl PushEvent {
    /// Whether the push landed on the repository's default branch.
    pub fn is_default_branch_push(&self) -> bool {
        let Some(git_ref) = &self.git_ref else {
            return false;
        };
        let Some(default_branch) = self
            .repository
            .as_ref()
            .and_then(|repo| repo.default_branch.as_deref())
        else {
            return false;
        };
        git_ref == &format!("refs/heads/{}", default_branch)
    }

    /// Whether any commit touched the project catalog or the search index.
    pub fn touches_project_data(&self) -> bool {
        self.commits.iter().any(|commit| {
            commit
                .paths()
                .any(|path| path.starts_with(PROJECT_DATA_PREFIX) || path == SEARCH_INDEX_PATH)
        })
    }
}
