use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the FOSSRadar CLI application.
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog failed to load or a record failed schema validation.
    #[error(transparent)]
    Store(#[from] project_store::StoreError),

    /// An allowlist file is missing or unreadable.
    #[error(transparent)]
    Allowlist(#[from] project_store::AllowlistError),

    /// A GitHub API call failed.
    #[error("GitHub error: {0}")]
    GitHub(#[from] github_client::Error),

    /// The enrichment run aborted.
    #[error(transparent)]
    Enrich(#[from] fossradar_core::EnrichError),

    /// The author verification flow failed.
    #[error(transparent)]
    Verify(#[from] fossradar_core::VerifyError),

    /// The visitor database could not be created or opened.
    #[error(transparent)]
    Visitor(#[from] fossradar_core::VisitorError),

    /// Missing or unusable configuration (typically an environment variable).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation completed but found problems.
    #[error("Validation found {0} error(s)")]
    ValidationFailed(usize),

    /// The PR author has no affiliation with the project repository.
    #[error("{author} is not affiliated with the repository behind \"{slug}\"")]
    NotAffiliated { author: String, slug: String },
}
