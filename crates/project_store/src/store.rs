//! Directory-backed project catalog.
//!
//! Loading is deliberately all-or-nothing: one corrupt record aborts the
//! whole load. The catalog is small and human-curated, and serving a partial
//! directory would hide exactly the records that need fixing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{instrument, warn};

use crate::errors::StoreError;
use crate::repo_url::normalize_repo_url;
use crate::schema::Project;
use crate::MAX_PROJECT_FILE_BYTES;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// A project record together with the filename it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProject {
    pub project: Project,
    pub filename: String,
}

/// Read access to the `data/projects/` directory.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    /// Creates a store over the given projects directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this store reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists all record filenames, sorted. A missing directory is an empty
    /// catalog, not an error.
    pub fn project_files(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.display().to_string(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(".toml") {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Parses and validates a single record by filename.
    pub fn parse_file(&self, filename: &str) -> Result<Project, StoreError> {
        let path = self.dir.join(filename);
        let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse_project_str(&content, filename)
    }

    /// Loads and validates the entire catalog.
    ///
    /// Beyond per-record schema checks this enforces the catalog-wide
    /// invariants: unique slugs, unique normalized repository URLs, and the
    /// filename matching `{slug}.toml`.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn load_all(&self) -> Result<Vec<StoredProject>, StoreError> {
        let files = self.project_files()?;
        let mut projects = Vec::with_capacity(files.len());
        let mut slugs = std::collections::HashSet::new();
        let mut repos = std::collections::HashSet::new();

        for filename in files {
            let project = self.parse_file(&filename)?;

            if !slugs.insert(project.slug.clone()) {
                return Err(StoreError::DuplicateSlug {
                    slug: project.slug,
                    file: filename,
                });
            }

            let normalized_repo = normalize_repo_url(&project.repo);
            if !repos.insert(normalized_repo) {
                return Err(StoreError::DuplicateRepo {
                    repo: project.repo,
                    file: filename,
                });
            }

            let expected = format!("{}.toml", project.slug);
            if filename != expected {
                return Err(StoreError::FilenameMismatch {
                    expected,
                    actual: filename,
                });
            }

            projects.push(StoredProject { project, filename });
        }

        Ok(projects)
    }

    /// Looks up a single record by slug.
    ///
    /// Returns `Ok(None)` when no record exists. A record that exists but no
    /// longer parses is also reported as absent, with a warning, so a broken
    /// file does not take a detail lookup down with it.
    pub fn get_by_slug(&self, slug: &str) -> Result<Option<Project>, StoreError> {
        let filename = format!("{}.toml", slug);
        if !self.dir.join(&filename).exists() {
            return Ok(None);
        }

        match self.parse_file(&filename) {
            Ok(project) => Ok(Some(project)),
            Err(error) => {
                warn!(slug = slug, error = %error, "Failed to load project record");
                Ok(None)
            }
        }
    }

    /// Finds the record whose repository URL normalizes to the same value as
    /// the given URL.
    pub fn find_by_repo(&self, repo_url: &str) -> Result<Option<StoredProject>, StoreError> {
        let needle = normalize_repo_url(repo_url);
        let projects = self.load_all()?;
        Ok(projects
            .into_iter()
            .find(|stored| normalize_repo_url(&stored.project.repo) == needle))
    }

    /// Whether a record with the given slug exists, judged by filename alone.
    pub fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        let filename = format!("{}.toml", slug);
        Ok(self.project_files()?.iter().any(|f| f == &filename))
    }
}

/// Parses TOML text into a validated [`Project`].
///
/// Enforces the size cap before parsing; schema violations are collected and
/// reported together.
pub fn parse_project_str(content: &str, filename: &str) -> Result<Project, StoreError> {
    if content.len() > MAX_PROJECT_FILE_BYTES {
        return Err(StoreError::FileTooLarge {
            file: filename.to_string(),
        });
    }

    let project: Project = toml::from_str(content).map_err(|source| StoreError::Toml {
        file: filename.to_string(),
        source: Box::new(source),
    })?;

    let issues = project.validate();
    if !issues.is_empty() {
        return Err(StoreError::Schema {
            file: filename.to_string(),
            issues,
        });
    }

    Ok(project)
}
