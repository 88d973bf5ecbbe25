//! The submission pipeline: validate, check for duplicates, render, publish.
//!
//! Field validation and allowlist membership run as one pass so the client
//! receives every problem at once. The duplicate-slug check runs against the
//! current store snapshot; the normalized-repository duplicate check is the
//! job of the `check-duplicate` endpoint earlier in the wizard, and the
//! catalog load enforces both invariants again at merge time.

use github_client::{LogoUpload, ProjectPublication, ProjectPublisher, PublishError, PullRequest};
use project_store::{
    render_project_toml, Allowlists, FieldIssue, ProjectStore, ProjectSubmission, StoreError,
};
use tracing::{info, instrument};

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;

/// Submission failures, in the order the pipeline can hit them.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// One or more fields violate the schema or an allowlist.
    #[error("Validation failed")]
    Invalid(Vec<FieldIssue>),

    /// A record with this slug already exists in the catalog.
    #[error("A project with slug \"{0}\" already exists. Please choose a different slug.")]
    DuplicateSlug(String),

    /// The store snapshot could not be inspected.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The GitHub publish sequence failed.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Validates submissions and hands them to the publisher.
pub struct SubmissionPipeline<'a> {
    store: &'a ProjectStore,
    allowlists: &'a Allowlists,
}

impl<'a> SubmissionPipeline<'a> {
    pub fn new(store: &'a ProjectStore, allowlists: &'a Allowlists) -> Self {
        Self { store, allowlists }
    }

    /// Runs schema and allowlist checks, returning every violation.
    pub fn validate(&self, submission: &ProjectSubmission) -> Vec<FieldIssue> {
        let mut issues = submission.validate();

        let invalid_tags = self.allowlists.invalid_tags(&submission.tags);
        if !invalid_tags.is_empty() {
            issues.push(FieldIssue::new(
                "tags",
                format!(
                    "Invalid tags: {}. Must be from the tags allowlist.",
                    invalid_tags.join(", ")
                ),
            ));
        }

        if !self.allowlists.validate_license(&submission.license) {
            issues.push(FieldIssue::new(
                "license",
                format!(
                    "Invalid license: {}. Must be an OSI-approved SPDX identifier.",
                    submission.license
                ),
            ));
        }

        if !self.allowlists.validate_category(&submission.category) {
            issues.push(FieldIssue::new(
                "category",
                format!("Unknown category \"{}\"", submission.category),
            ));
        }

        issues
    }

    /// Validates the submission and publishes it as a pull request.
    ///
    /// # Errors
    ///
    /// * [`SubmissionError::Invalid`] with field-level issues (HTTP 400)
    /// * [`SubmissionError::DuplicateSlug`] for an existing slug (HTTP 409)
    /// * [`SubmissionError::Publish`] for GitHub failures (mapped per step)
    #[instrument(skip(self, submission, logo, publisher), fields(slug = %submission.slug))]
    pub async fn submit(
        &self,
        submission: &ProjectSubmission,
        submitter_name: Option<String>,
        logo: Option<LogoUpload>,
        publisher: &ProjectPublisher,
    ) -> Result<PullRequest, SubmissionError> {
        let issues = self.validate(submission);
        if !issues.is_empty() {
            return Err(SubmissionError::Invalid(issues));
        }

        if self.store.slug_exists(&submission.slug)? {
            return Err(SubmissionError::DuplicateSlug(submission.slug.clone()));
        }

        let toml_content = render_project_toml(submission);
        info!(
            slug = %submission.slug,
            bytes = toml_content.len(),
            has_logo = logo.is_some(),
            "Publishing submission"
        );

        let publication = ProjectPublication {
            slug: submission.slug.clone(),
            toml_content,
            submitter_name,
            logo,
        };

        Ok(publisher.publish(&publication).await?)
    }
}
