//! Enrichment of stored records with live GitHub data.
//!
//! The enrichment engine is the only writer of the server-computed record
//! fields: `stars`, `good_first_issues`, `verified` and `primary_lang`. It
//! edits exactly those lines in each TOML file, leaving the rest of the file
//! byte-for-byte intact so human edits survive, and drops the bulkier data
//! (contributors, installation, documentation, languages) into a per-project
//! JSON cache instead of the record itself.
//!
//! Records are re-read immediately before their line edits; a concurrent
//! human edit between read and write still loses (whole-file
//! last-writer-wins), the window is just kept small.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use tracing::{info, instrument, warn};

use github_client::{
    Contributor, DocumentationLinks, GitHubClient, InstallationMethod, RepoMetadata,
    DIRECTORY_TOPIC,
};
use project_store::{parse_github_url, ProjectStore, StoreError, StoredProject};

#[cfg(test)]
#[path = "enrich_tests.rs"]
mod tests;

/// Errors that abort the whole enrichment run (per-project failures do not).
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to write {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache data")]
    Serialize(#[from] serde_json::Error),
}

/// What happened to one project during a run.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentOutcome {
    pub slug: String,
    pub updated: bool,
    pub stars: u64,
    pub good_first_issues: u32,
    pub verified: bool,
    pub contributors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichmentOutcome {
    fn skipped(slug: &str, error: impl Into<String>) -> Self {
        Self {
            slug: slug.to_string(),
            updated: false,
            stars: 0,
            good_first_issues: 0,
            verified: false,
            contributors: 0,
            error: Some(error.into()),
        }
    }
}

/// Repository statistics cached next to the record.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub size: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub has_wiki: bool,
    pub has_pages: bool,
    pub has_discussions: bool,
}

impl From<&RepoMetadata> for CacheStats {
    fn from(meta: &RepoMetadata) -> Self {
        Self {
            forks: meta.forks,
            watchers: meta.watchers,
            open_issues: meta.open_issues,
            size: meta.size,
            created_at: meta.created_at.clone(),
            updated_at: meta.updated_at.clone(),
            pushed_at: meta.pushed_at.clone(),
            has_wiki: meta.has_wiki,
            has_pages: meta.has_pages,
            has_discussions: meta.has_discussions,
        }
    }
}

/// The per-project JSON cache written under `public/cache/{slug}.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectCache {
    pub slug: String,
    pub contributors: Vec<Contributor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation: Option<InstallationMethod>,
    pub documentation: DocumentationLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CacheStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<std::collections::BTreeMap<String, u64>>,
    pub updated_at: String,
}

/// Runs enrichment over the whole catalog.
pub struct Enricher<'a> {
    client: &'a GitHubClient,
    store: &'a ProjectStore,
    cache_dir: PathBuf,
    pause: Duration,
}

impl<'a> Enricher<'a> {
    pub fn new(client: &'a GitHubClient, store: &'a ProjectStore, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            store,
            cache_dir: cache_dir.into(),
            // Spacing between projects keeps the run under the API rate limit.
            pause: Duration::from_secs(1),
        }
    }

    /// Overrides the inter-project pause (tests use zero).
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Enriches every record in the catalog.
    ///
    /// A project whose repository cannot be reached is reported in its
    /// outcome and skipped; only store and filesystem failures abort the run.
    #[instrument(skip(self))]
    pub async fn enrich_all(&self) -> Result<Vec<EnrichmentOutcome>, EnrichError> {
        let projects = self.store.load_all()?;
        info!(count = projects.len(), "Enriching project records");

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|source| EnrichError::Io {
                path: self.cache_dir.display().to_string(),
                source,
            })?;

        let mut outcomes = Vec::with_capacity(projects.len());
        let mut first = true;
        for stored in &projects {
            if !first && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            first = false;
            outcomes.push(self.enrich_project(stored).await?);
        }

        Ok(outcomes)
    }

    async fn enrich_project(&self, stored: &StoredProject) -> Result<EnrichmentOutcome, EnrichError> {
        let slug = &stored.project.slug;
        let Some((owner, repo)) = parse_github_url(&stored.project.repo) else {
            warn!(slug = %slug, repo = %stored.project.repo, "Record has an unparseable repository URL");
            return Ok(EnrichmentOutcome::skipped(slug, "invalid repository URL"));
        };

        let metadata = match self.client.get_repository(&owner, &repo).await {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(slug = %slug, error = %error, "Could not fetch repository metadata");
                return Ok(EnrichmentOutcome::skipped(slug, "could not fetch metadata"));
            }
        };

        let good_first_issues = self
            .client
            .count_good_first_issues(&owner, &repo)
            .await
            .unwrap_or(0);

        let has_topic = self
            .client
            .has_topic(&owner, &repo, DIRECTORY_TOPIC)
            .await
            .unwrap_or(false);
        let has_badge = self
            .client
            .has_verified_badge(&owner, &repo)
            .await
            .unwrap_or(false);
        let verified = has_topic && has_badge;

        let contributors: Vec<Contributor> = self
            .client
            .list_contributors(&owner, &repo, 10)
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|c| !c.avatar_url.is_empty() && !c.html_url.is_empty())
            .collect();

        let installation = self.client.detect_installation(&owner, &repo).await.ok();
        let documentation = self
            .client
            .find_documentation(&owner, &repo)
            .await
            .unwrap_or_default();
        let languages = self
            .client
            .language_breakdown(&owner, &repo)
            .await
            .unwrap_or_default();

        // Re-read right before editing to shrink the window against a
        // concurrent human edit.
        let record_path = self.store.dir().join(&stored.filename);
        let content =
            tokio::fs::read_to_string(&record_path)
                .await
                .map_err(|source| EnrichError::Io {
                    path: record_path.display().to_string(),
                    source,
                })?;
        let rewritten = rewrite_record_fields(
            &content,
            metadata.stars,
            good_first_issues,
            verified,
            metadata.language.as_deref(),
        );
        if rewritten != content {
            tokio::fs::write(&record_path, &rewritten)
                .await
                .map_err(|source| EnrichError::Io {
                    path: record_path.display().to_string(),
                    source,
                })?;
        }

        let cache = ProjectCache {
            slug: slug.clone(),
            contributors: contributors.clone(),
            installation,
            documentation,
            stats: Some(CacheStats::from(&metadata)),
            languages: if languages.is_empty() {
                None
            } else {
                Some(languages)
            },
            updated_at: Utc::now().to_rfc3339(),
        };
        let cache_path = self.cache_dir.join(format!("{}.json", slug));
        let serialized = serde_json::to_string_pretty(&cache)?;
        tokio::fs::write(&cache_path, serialized)
            .await
            .map_err(|source| EnrichError::Io {
                path: cache_path.display().to_string(),
                source,
            })?;

        info!(
            slug = %slug,
            stars = metadata.stars,
            good_first_issues = good_first_issues,
            verified = verified,
            "Enriched project record"
        );

        Ok(EnrichmentOutcome {
            slug: slug.clone(),
            updated: true,
            stars: metadata.stars,
            good_first_issues,
            verified,
            contributors: contributors.len(),
            error: None,
        })
    }
}

fn stars_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^stars = \d+$").expect("valid regex"))
}

fn good_first_issues_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^good_first_issues = \d+$").expect("valid regex"))
}

fn verified_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^verified = (?:true|false)$").expect("valid regex"))
}

fn contributors_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(looking_for_contributors = .*)$").expect("valid regex"))
}

fn primary_lang_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^primary_lang = ".*"$"#).expect("valid regex"))
}

fn added_at_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^added_at = ").expect("valid regex"))
}

/// Rewrites the server-computed lines of a record, leaving everything else
/// untouched. Missing fields are inserted at their canonical position.
pub fn rewrite_record_fields(
    content: &str,
    stars: u64,
    good_first_issues: u32,
    verified: bool,
    language: Option<&str>,
) -> String {
    let mut content = content.to_string();

    if stars_line_regex().is_match(&content) {
        content = stars_line_regex()
            .replace(&content, format!("stars = {}", stars).as_str())
            .into_owned();
    } else {
        // The whole server-computed block is absent; add it after the last
        // submitted field.
        let block = format!(
            "\n\ngood_first_issues = {}\nstars = {}\nverified = {}",
            good_first_issues, stars, verified
        );
        content = contributors_line_regex()
            .replace(&content, |caps: &regex::Captures<'_>| {
                format!("{}{}", &caps[1], block)
            })
            .into_owned();
    }

    if good_first_issues_line_regex().is_match(&content) {
        content = good_first_issues_line_regex()
            .replace(
                &content,
                format!("good_first_issues = {}", good_first_issues).as_str(),
            )
            .into_owned();
    }

    if verified_line_regex().is_match(&content) {
        content = verified_line_regex()
            .replace(&content, format!("verified = {}", verified).as_str())
            .into_owned();
    }

    if let Some(language) = language {
        let line = format!("primary_lang = \"{}\"", language);
        if primary_lang_line_regex().is_match(&content) {
            content = primary_lang_line_regex()
                .replace(&content, regex::NoExpand(&line))
                .into_owned();
        } else {
            content = added_at_line_regex()
                .replace(&content, regex::NoExpand(&format!("{}\nadded_at = ", line)))
                .into_owned();
        }
    }

    content
}
