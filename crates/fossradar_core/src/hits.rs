//! File-backed page-hit counter.
//!
//! Hits live in one JSON object mapping slug to count. Reads tolerate a
//! missing or corrupt file (an empty map); writes are read-modify-write under
//! a process-local lock. This is the fallback counter, not the canonical
//! visitor count, and it makes no durability promises beyond the file itself.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{instrument, warn};

#[cfg(test)]
#[path = "hits_tests.rs"]
mod tests;

/// Errors from the hits file store.
#[derive(Debug, thiserror::Error)]
pub enum HitsError {
    #[error("Failed to write hits file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize hits data")]
    Serialize(#[from] serde_json::Error),
}

/// Counter map persisted as a single JSON file.
pub struct HitsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HitsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> BTreeMap<String, u64> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(hits) => hits,
                Err(error) => {
                    warn!(path = %self.path.display(), error = %error, "Hits file is corrupt, starting over");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        }
    }

    /// Current hit count for a slug; unknown slugs read as 0.
    pub async fn get(&self, slug: &str) -> u64 {
        let _guard = self.lock.lock().await;
        self.read().await.get(slug).copied().unwrap_or(0)
    }

    /// Increments the counter for a slug and persists the file.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn increment(&self, slug: &str) -> Result<u64, HitsError> {
        let _guard = self.lock.lock().await;
        let mut hits = self.read().await;
        let count = hits.entry(slug.to_string()).or_insert(0);
        *count += 1;
        let count = *count;

        let serialized = serde_json::to_string_pretty(&hits)?;
        tokio::fs::write(&self.path, serialized)
            .await
            .map_err(|source| HitsError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(count)
    }
}
