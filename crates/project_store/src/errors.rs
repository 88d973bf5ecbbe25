//! Error types for project record loading and allowlist handling.

use crate::schema::FieldIssue;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur while reading or validating the project catalog.
///
/// Catalog loading is fail-hard: the first violation aborts the whole load so
/// that a corrupt record can never be served as part of the directory.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading a record or the data directory failed.
    #[error("Failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The record exceeds the per-file size cap.
    #[error("File {file} exceeds maximum size of 10 KiB")]
    FileTooLarge { file: String },

    /// The record is not valid TOML.
    #[error("Invalid TOML in {file}")]
    Toml {
        file: String,
        #[source]
        source: Box<toml::de::Error>,
    },

    /// The record parsed but one or more fields violate the schema.
    #[error("{file} failed schema validation ({} issue(s))", issues.len())]
    Schema { file: String, issues: Vec<FieldIssue> },

    /// Two records declare the same slug.
    #[error("Duplicate slug \"{slug}\" found in {file}")]
    DuplicateSlug { slug: String, file: String },

    /// Two records declare repository URLs that normalize to the same value.
    #[error("Duplicate repository \"{repo}\" found in {file}")]
    DuplicateRepo { repo: String, file: String },

    /// A record file is not named `{slug}.toml`.
    #[error("Filename mismatch: expected \"{expected}\", got \"{actual}\"")]
    FilenameMismatch { expected: String, actual: String },
}

/// Errors that can occur while loading the static allowlist files.
#[derive(Debug, thiserror::Error)]
pub enum AllowlistError {
    #[error("Failed to read allowlist {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in allowlist {path}")]
    Toml {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("Invalid JSON in allowlist {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
