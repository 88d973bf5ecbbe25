//! Flat-file store for FOSSRadar project records.
//!
//! Projects live as one TOML file per project in a data directory. This crate
//! parses and validates those records, enforces catalog-wide invariants
//! (unique slugs, unique normalized repository URLs, filename matching the
//! slug), loads the static allowlists used during validation, and renders the
//! canonical TOML text for new submissions.

pub mod allowlists;
pub mod errors;
pub mod repo_url;
pub mod schema;
pub mod slug;
pub mod store;
pub mod toml_writer;

pub use allowlists::{Allowlists, CategoryInfo};
pub use errors::{AllowlistError, StoreError};
pub use repo_url::{normalize_repo_url, parse_github_url};
pub use schema::{FieldIssue, IndiaConnection, Project, ProjectSubmission};
pub use slug::{generate_slug, generate_unique_slug, is_reserved_slug, is_valid_slug};
pub use store::{parse_project_str, ProjectStore, StoredProject};
pub use toml_writer::render_project_toml;

/// Maximum size of a single project record file, in bytes.
///
/// Records are short; anything larger is treated as spam rather than data.
pub const MAX_PROJECT_FILE_BYTES: usize = 10 * 1024;
