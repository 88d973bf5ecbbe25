//! GitHub repository URL normalization and parsing.

use url::Url;

#[cfg(test)]
#[path = "repo_url_tests.rs"]
mod tests;

/// Normalizes a repository URL for duplicate comparison.
///
/// Lowercases the whole URL, strips any trailing slashes and a trailing
/// `.git` suffix, so `https://github.com/Acme/Widget.git/` compares equal to
/// `https://github.com/acme/widget`.
pub fn normalize_repo_url(url: &str) -> String {
    let mut normalized = url.to_ascii_lowercase();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    if let Some(stripped) = normalized.strip_suffix(".git") {
        normalized = stripped.to_string();
    }
    normalized
}

/// Extracts `(owner, repo)` from a GitHub repository URL.
///
/// Returns `None` for non-GitHub hosts, unparseable URLs, or paths without
/// both segments. A `.git` suffix on the repository segment is dropped.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    if parsed.host_str() != Some("github.com") {
        return None;
    }

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?.to_string();
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo).to_string();

    if owner.is_empty() || repo.is_empty() {
        return None;
    }

    Some((owner, repo))
}
