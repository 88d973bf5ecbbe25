//! CLI configuration resolved from the environment.
//!
//! The CLI runs from the repository root of the data repository, so every
//! path defaults to the conventional layout (`data/`, `public/`) and can be
//! overridden with environment variables for out-of-tree runs.

use std::env;
use std::path::PathBuf;

use github_client::GitHubClient;
use project_store::{Allowlists, ProjectStore};

use crate::errors::Error;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Resolved paths and credentials for a CLI invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory holding the allowlists and the `projects/` records.
    pub data_dir: PathBuf,

    /// Directory holding static site assets (logo files live under
    /// `public/logos/`).
    pub public_dir: PathBuf,

    /// Directory the enrichment engine writes per-project caches into.
    pub cache_dir: PathBuf,

    /// SQLite visitor database path.
    pub db_path: PathBuf,

    /// GitHub token, when one is configured.
    pub github_token: Option<String>,
}

impl CliConfig {
    /// Reads the configuration from the environment, with conventional
    /// defaults for everything.
    pub fn from_env() -> Self {
        let data_dir =
            PathBuf::from(env::var("FOSSRADAR_DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let public_dir = PathBuf::from(
            env::var("FOSSRADAR_PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
        );
        let cache_dir = env::var("FOSSRADAR_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| public_dir.join("cache"));
        let db_path = env::var("VISITOR_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("visitors.db"));

        Self {
            data_dir,
            public_dir,
            cache_dir,
            db_path,
            github_token: env::var("GITHUB_TOKEN").ok(),
        }
    }

    /// The directory the project records live in.
    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    /// A store over the projects directory.
    pub fn store(&self) -> ProjectStore {
        ProjectStore::new(self.projects_dir())
    }

    /// Loads the allowlists from the data directory.
    pub fn allowlists(&self) -> Result<Allowlists, Error> {
        Ok(Allowlists::load(&self.data_dir)?)
    }

    /// A GitHub client: token-authenticated when a token is configured,
    /// anonymous otherwise.
    pub fn github_client(&self) -> Result<GitHubClient, Error> {
        match &self.github_token {
            Some(token) => Ok(GitHubClient::from_token(token)?),
            None => Ok(GitHubClient::anonymous()?),
        }
    }

    /// A GitHub client that refuses to run anonymously.
    pub fn authenticated_github_client(&self) -> Result<GitHubClient, Error> {
        let token = self.github_token.as_ref().ok_or_else(|| {
            Error::Config("GITHUB_TOKEN is required for this command".to_string())
        })?;
        Ok(GitHubClient::from_token(token)?)
    }
}
