//! Project record schema and field validation.
//!
//! The schema mirrors the TOML layout of the records in `data/projects/`.
//! Parsing is serde-driven; field constraints are enforced separately so a
//! single pass can report every violation with its field path, which the API
//! surfaces as field-level details on a 400 response.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::slug::is_reserved_slug;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// The record field that failed validation.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The kind of connection a project has to India.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndiaConnection {
    /// Founded by someone from India.
    Founder,
    /// The maintaining organization is based in India.
    Organization,
    /// The project primarily serves an Indian community.
    Community,
    /// Significant contributions come from India.
    Contributor,
}

impl IndiaConnection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Founder => "founder",
            Self::Organization => "organization",
            Self::Community => "community",
            Self::Contributor => "contributor",
        }
    }
}

/// A validated project record as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// URL-safe unique identifier; also the filename stem.
    pub slug: String,
    pub name: String,
    pub short_desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// GitHub repository URL.
    pub repo: String,
    /// SPDX identifier, checked against the OSI allowlist.
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Date the project was added, `YYYY-MM-DD`.
    pub added_at: String,
    pub primary_lang: String,
    pub category: String,
    pub tags: Vec<String>,
    pub looking_for_contributors: bool,
    pub location_city: String,
    pub location_indian_state: String,
    #[serde(default)]
    pub good_first_issues: u32,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub india_connection: Option<IndiaConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub india_connection_details: Option<String>,
}

impl Project {
    /// Checks every field constraint and returns all violations at once.
    pub fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        validate_common_fields(&mut issues, &CommonFields {
            slug: &self.slug,
            name: &self.name,
            short_desc: &self.short_desc,
            website: self.website.as_deref(),
            repo: &self.repo,
            license: &self.license,
            logo: self.logo.as_deref(),
            added_at: &self.added_at,
            primary_lang: &self.primary_lang,
            category: &self.category,
            tags: &self.tags,
            location_city: &self.location_city,
            location_indian_state: &self.location_indian_state,
            india_connection_details: self.india_connection_details.as_deref(),
        });
        issues
    }
}

/// A client-submitted project, before server-computed fields exist.
///
/// Compared to [`Project`] this drops `stars`, `good_first_issues` and
/// `verified` (the enrichment pipeline owns those) and adds free-form notes
/// for the reviewing maintainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSubmission {
    pub slug: String,
    pub name: String,
    pub short_desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub repo: String,
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub added_at: String,
    pub primary_lang: String,
    pub category: String,
    pub tags: Vec<String>,
    pub looking_for_contributors: bool,
    pub location_city: String,
    pub location_indian_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub india_connection: Option<IndiaConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub india_connection_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_notes: Option<String>,
}

impl ProjectSubmission {
    /// Checks every field constraint and returns all violations at once.
    pub fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        validate_common_fields(&mut issues, &CommonFields {
            slug: &self.slug,
            name: &self.name,
            short_desc: &self.short_desc,
            website: self.website.as_deref(),
            repo: &self.repo,
            license: &self.license,
            logo: self.logo.as_deref(),
            added_at: &self.added_at,
            primary_lang: &self.primary_lang,
            category: &self.category,
            tags: &self.tags,
            location_city: &self.location_city,
            location_indian_state: &self.location_indian_state,
            india_connection_details: self.india_connection_details.as_deref(),
        });

        if let Some(notes) = &self.submitter_notes {
            if notes.chars().count() > 500 {
                issues.push(FieldIssue::new(
                    "submitter_notes",
                    "Notes must be at most 500 characters",
                ));
            }
        }

        issues
    }
}

/// Fields shared between stored records and submissions.
struct CommonFields<'a> {
    slug: &'a str,
    name: &'a str,
    short_desc: &'a str,
    website: Option<&'a str>,
    repo: &'a str,
    license: &'a str,
    logo: Option<&'a str>,
    added_at: &'a str,
    primary_lang: &'a str,
    category: &'a str,
    tags: &'a [String],
    location_city: &'a str,
    location_indian_state: &'a str,
    india_connection_details: Option<&'a str>,
}

fn slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("valid slug regex"))
}

fn repo_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https://github\.com/[^/]+/[^/]+/?$").expect("valid repo regex")
    })
}

fn logo_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/logos/[^/]+\.(svg|png|jpg|jpeg|webp)$").expect("valid logo regex")
    })
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"))
}

fn char_len_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

fn validate_common_fields(issues: &mut Vec<FieldIssue>, fields: &CommonFields<'_>) {
    if !slug_regex().is_match(fields.slug) {
        issues.push(FieldIssue::new(
            "slug",
            "Slug must contain only lowercase letters, numbers, and hyphens",
        ));
    }
    if fields.slug.len() < 2 {
        issues.push(FieldIssue::new("slug", "Slug must be at least 2 characters"));
    }
    if fields.slug.len() > 60 {
        issues.push(FieldIssue::new("slug", "Slug must be at most 60 characters"));
    }
    if is_reserved_slug(fields.slug) {
        issues.push(FieldIssue::new(
            "slug",
            "This slug is reserved and cannot be used",
        ));
    }

    if !char_len_between(fields.name, 2, 80) {
        issues.push(FieldIssue::new(
            "name",
            "Name must be between 2 and 80 characters",
        ));
    }

    if !char_len_between(fields.short_desc, 10, 160) {
        issues.push(FieldIssue::new(
            "short_desc",
            "Description must be between 10 and 160 characters",
        ));
    }

    if let Some(website) = fields.website {
        if !website.is_empty() && url::Url::parse(website).is_err() {
            issues.push(FieldIssue::new("website", "Website must be a valid URL"));
        }
    }

    if !repo_regex().is_match(fields.repo) {
        issues.push(FieldIssue::new(
            "repo",
            "Must be a valid GitHub repository URL",
        ));
    }

    if fields.license.is_empty() {
        issues.push(FieldIssue::new("license", "License is required"));
    }

    if let Some(logo) = fields.logo {
        if !logo.is_empty() && !logo_regex().is_match(logo) {
            issues.push(FieldIssue::new(
                "logo",
                "Logo must be under /logos/ and be a valid image format",
            ));
        }
    }

    if !date_regex().is_match(fields.added_at) {
        issues.push(FieldIssue::new(
            "added_at",
            "Date must be in YYYY-MM-DD format",
        ));
    }

    if fields.primary_lang.is_empty() {
        issues.push(FieldIssue::new(
            "primary_lang",
            "Primary language is required",
        ));
    }

    if fields.category.is_empty() {
        issues.push(FieldIssue::new("category", "Category is required"));
    }

    if fields.tags.is_empty() {
        issues.push(FieldIssue::new("tags", "At least one tag is required"));
    }
    if fields.tags.len() > 10 {
        issues.push(FieldIssue::new("tags", "Maximum 10 tags allowed"));
    }

    if !char_len_between(fields.location_city, 2, 100) {
        issues.push(FieldIssue::new(
            "location_city",
            "City name must be between 2 and 100 characters",
        ));
    }

    if !char_len_between(fields.location_indian_state, 2, 100) {
        issues.push(FieldIssue::new(
            "location_indian_state",
            "State name must be between 2 and 100 characters",
        ));
    }

    if let Some(details) = fields.india_connection_details {
        if details.chars().count() > 500 {
            issues.push(FieldIssue::new(
                "india_connection_details",
                "Connection details must be at most 500 characters",
            ));
        }
    }
}
