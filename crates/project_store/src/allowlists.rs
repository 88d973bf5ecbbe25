//! Static allowlists for tags, licenses and categories.
//!
//! The allowlists are deploy-time static files under the data directory:
//! `tags.toml`, `licenses-osi.json` and `categories.json`. They are loaded
//! once and held for the process lifetime by whoever owns the instance; there
//! is no invalidation because the files only change with a deploy.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::AllowlistError;

#[cfg(test)]
#[path = "allowlists_tests.rs"]
mod tests;

/// Display metadata for a category key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryInfo {
    pub label: String,
    pub description: String,
    pub icon: String,
}

#[derive(Deserialize)]
struct TagsFile {
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct LicensesFile {
    licenses: Vec<String>,
}

#[derive(Deserialize)]
struct CategoriesFile {
    categories: HashMap<String, CategoryInfo>,
}

/// The three allowlists used during submission and catalog validation.
#[derive(Debug, Clone)]
pub struct Allowlists {
    tags: HashSet<String>,
    licenses: HashSet<String>,
    categories: HashMap<String, CategoryInfo>,
}

impl Allowlists {
    /// Loads all three allowlist files from the data directory.
    pub fn load(data_dir: &Path) -> Result<Self, AllowlistError> {
        let tags_path = data_dir.join("tags.toml");
        let content = fs::read_to_string(&tags_path).map_err(|source| AllowlistError::Io {
            path: tags_path.display().to_string(),
            source,
        })?;
        let tags_file: TagsFile =
            toml::from_str(&content).map_err(|source| AllowlistError::Toml {
                path: tags_path.display().to_string(),
                source: Box::new(source),
            })?;
        let tags: HashSet<String> = tags_file
            .tags
            .into_iter()
            .map(|t| t.to_lowercase())
            .collect();

        let licenses_path = data_dir.join("licenses-osi.json");
        let content = fs::read_to_string(&licenses_path).map_err(|source| AllowlistError::Io {
            path: licenses_path.display().to_string(),
            source,
        })?;
        let licenses_file: LicensesFile =
            serde_json::from_str(&content).map_err(|source| AllowlistError::Json {
                path: licenses_path.display().to_string(),
                source,
            })?;
        let licenses: HashSet<String> = licenses_file.licenses.into_iter().collect();

        let categories_path = data_dir.join("categories.json");
        let content = fs::read_to_string(&categories_path).map_err(|source| AllowlistError::Io {
            path: categories_path.display().to_string(),
            source,
        })?;
        let categories_file: CategoriesFile =
            serde_json::from_str(&content).map_err(|source| AllowlistError::Json {
                path: categories_path.display().to_string(),
                source,
            })?;

        debug!(
            tags = tags.len(),
            licenses = licenses.len(),
            categories = categories_file.categories.len(),
            "Loaded allowlists"
        );

        Ok(Self {
            tags,
            licenses,
            categories: categories_file.categories,
        })
    }

    /// Returns the tags that are not on the allowlist (case-insensitive).
    pub fn invalid_tags(&self, tags: &[String]) -> Vec<String> {
        tags.iter()
            .filter(|tag| !self.tags.contains(&tag.to_lowercase()))
            .cloned()
            .collect()
    }

    /// Whether every tag is on the allowlist.
    pub fn validate_tags(&self, tags: &[String]) -> bool {
        self.invalid_tags(tags).is_empty()
    }

    /// Whether the license is an OSI-approved SPDX identifier.
    pub fn validate_license(&self, license: &str) -> bool {
        self.licenses.contains(license)
    }

    /// Whether the category key exists in the category map.
    pub fn validate_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Display metadata for a category key, if known.
    pub fn category(&self, key: &str) -> Option<&CategoryInfo> {
        self.categories.get(key)
    }

    /// All known category keys, sorted.
    pub fn category_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
