//! Visitor counting behind a single capability interface.
//!
//! Two backends exist and are selected at configuration time, never composed:
//! an external counter service reached over HTTP, and an embedded SQLite
//! database. The service variant cannot answer aggregate queries; it says so
//! through [`VisitorError::NotSupported`] instead of silently returning
//! empty data, and callers decide how to degrade.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

#[cfg(test)]
#[path = "visitors_tests.rs"]
mod tests;

/// Errors from the visitor backends.
#[derive(Debug, thiserror::Error)]
pub enum VisitorError {
    /// The configured backend cannot serve this operation.
    #[error("The configured visitor backend does not support this operation")]
    NotSupported,

    /// The counter service could not be reached or answered with an error.
    #[error("Counter service request failed")]
    Http(#[from] reqwest::Error),

    /// The counter service answered with something unexpected.
    #[error("Counter service returned an unexpected payload")]
    InvalidResponse,

    /// The embedded database failed.
    #[error("Visitor database error")]
    Database(#[from] rusqlite::Error),
}

/// One slug's counter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitorRecord {
    pub slug: String,
    pub count: u64,
    pub first_visited: Option<String>,
    pub last_visited: Option<String>,
}

/// Aggregate statistics over all counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VisitorStatistics {
    pub total_projects: u64,
    pub total_visitors: u64,
    pub average_visitors: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_project: Option<VisitorRecord>,
}

/// The capability interface both backends implement.
#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Increments the counter for a slug and returns the new value.
    async fn increment(&self, slug: &str) -> Result<u64, VisitorError>;

    /// Current counter value; unknown slugs read as 0.
    async fn get(&self, slug: &str) -> Result<u64, VisitorError>;

    /// The `limit` highest counters, descending.
    async fn top(&self, limit: usize) -> Result<Vec<VisitorRecord>, VisitorError>;

    /// Up to `limit` counters, highest first.
    async fn all(&self, limit: usize) -> Result<Vec<VisitorRecord>, VisitorError>;

    /// Aggregate statistics.
    async fn stats(&self) -> Result<VisitorStatistics, VisitorError>;

    /// Resets a counter to zero.
    async fn reset(&self, slug: &str) -> Result<(), VisitorError>;
}

// --- Counter service backend ---

#[derive(Debug, Deserialize)]
struct CounterValue {
    #[serde(alias = "value")]
    count: u64,
}

/// Visitor counting delegated to an external counter service.
///
/// Counter keys are namespaced per workspace and named `visitor-{slug}`.
/// Atomicity is the service's own; this client only issues one call per
/// operation.
pub struct CounterApiStore {
    http: reqwest::Client,
    base_url: String,
    workspace: String,
    token: Option<String>,
}

impl CounterApiStore {
    /// Builds a client for the service with a 5 second request timeout.
    pub fn new(
        base_url: impl Into<String>,
        workspace: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, VisitorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            workspace: workspace.into(),
            token,
        })
    }

    fn counter_url(&self, slug: &str, action: Option<&str>) -> String {
        let mut url = format!("{}/{}/visitor-{}", self.base_url, self.workspace, slug);
        if let Some(action) = action {
            url.push('/');
            url.push_str(action);
        }
        url
    }

    async fn call(&self, url: &str) -> Result<reqwest::Response, VisitorError> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }
}

#[async_trait]
impl VisitorStore for CounterApiStore {
    #[instrument(skip(self), fields(slug = %slug))]
    async fn increment(&self, slug: &str) -> Result<u64, VisitorError> {
        let url = self.counter_url(slug, Some("up"));
        let response = self.call(&url).await?.error_for_status()?;
        let value: CounterValue = response
            .json()
            .await
            .map_err(|_| VisitorError::InvalidResponse)?;
        Ok(value.count)
    }

    #[instrument(skip(self), fields(slug = %slug))]
    async fn get(&self, slug: &str) -> Result<u64, VisitorError> {
        let url = self.counter_url(slug, None);
        let response = self.call(&url).await?;
        if !response.status().is_success() {
            // A counter that was never incremented does not exist yet.
            debug!(slug = slug, status = %response.status(), "Counter not found, reading as 0");
            return Ok(0);
        }
        let value: CounterValue = response
            .json()
            .await
            .map_err(|_| VisitorError::InvalidResponse)?;
        Ok(value.count)
    }

    async fn top(&self, _limit: usize) -> Result<Vec<VisitorRecord>, VisitorError> {
        warn!("Top-visitor queries are not supported by the counter service backend");
        Err(VisitorError::NotSupported)
    }

    async fn all(&self, _limit: usize) -> Result<Vec<VisitorRecord>, VisitorError> {
        warn!("Bulk visitor queries are not supported by the counter service backend");
        Err(VisitorError::NotSupported)
    }

    async fn stats(&self) -> Result<VisitorStatistics, VisitorError> {
        warn!("Visitor statistics are not supported by the counter service backend");
        Err(VisitorError::NotSupported)
    }

    #[instrument(skip(self), fields(slug = %slug))]
    async fn reset(&self, slug: &str) -> Result<(), VisitorError> {
        let url = self.counter_url(slug, Some("reset"));
        self.call(&url).await?.error_for_status()?;
        Ok(())
    }
}

// --- SQLite backend ---

/// Visitor counting in an embedded SQLite database.
///
/// This is the backend that supports the aggregate queries the admin
/// endpoint wants. Increment is a single upsert so concurrent requests
/// serialize inside SQLite.
pub struct SqliteVisitorStore {
    conn: Mutex<Connection>,
}

impl SqliteVisitorStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: &Path) -> Result<Self, VisitorError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, VisitorError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Creates the visitors table and its indexes. Idempotent.
pub fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS visitors (
            slug TEXT PRIMARY KEY,
            count INTEGER NOT NULL DEFAULT 0,
            first_visited TEXT NOT NULL,
            last_visited TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_visitors_count ON visitors(count DESC);
        CREATE INDEX IF NOT EXISTS idx_visitors_last_visited ON visitors(last_visited DESC);",
    )
}

#[async_trait]
impl VisitorStore for SqliteVisitorStore {
    #[instrument(skip(self), fields(slug = %slug))]
    async fn increment(&self, slug: &str) -> Result<u64, VisitorError> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().await;
        let count: u64 = conn.query_row(
            "INSERT INTO visitors (slug, count, first_visited, last_visited)
             VALUES (?1, 1, ?2, ?2)
             ON CONFLICT(slug) DO UPDATE SET count = count + 1, last_visited = ?2
             RETURNING count",
            params![slug, now],
            |row| row.get::<_, i64>(0).map(|v| v as u64),
        )?;
        Ok(count)
    }

    async fn get(&self, slug: &str) -> Result<u64, VisitorError> {
        let conn = self.conn.lock().await;
        let count: Option<u64> = conn
            .query_row(
                "SELECT count FROM visitors WHERE slug = ?1",
                params![slug],
                |row| row.get::<_, i64>(0).map(|v| v as u64),
            )
            .optional()?;
        Ok(count.unwrap_or(0))
    }

    async fn top(&self, limit: usize) -> Result<Vec<VisitorRecord>, VisitorError> {
        self.all(limit).await
    }

    async fn all(&self, limit: usize) -> Result<Vec<VisitorRecord>, VisitorError> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(
            "SELECT slug, count, first_visited, last_visited
             FROM visitors ORDER BY count DESC, slug ASC LIMIT ?1",
        )?;
        let rows = statement.query_map(params![limit as i64], |row| {
            Ok(VisitorRecord {
                slug: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
                first_visited: row.get(2)?,
                last_visited: row.get(3)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    async fn stats(&self) -> Result<VisitorStatistics, VisitorError> {
        let (total_projects, total_visitors, average_visitors) = {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(count), 0), COALESCE(AVG(count), 0.0)
                 FROM visitors",
                [],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64, row.get::<_, f64>(2)?)),
            )?
        };

        let top_project = self.top(1).await?.into_iter().next();

        Ok(VisitorStatistics {
            total_projects,
            total_visitors,
            average_visitors,
            top_project,
        })
    }

    #[instrument(skip(self), fields(slug = %slug))]
    async fn reset(&self, slug: &str) -> Result<(), VisitorError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE visitors SET count = 0 WHERE slug = ?1",
            params![slug],
        )?;
        Ok(())
    }
}
