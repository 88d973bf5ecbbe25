//! FOSSRadar API Server
//!
//! Main binary for running the API server in production or development.
//!
//! # Environment Variables
//!
//! - `API_PORT`: Port to listen on (default: 8080)
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `RUST_LOG`: Log level (default: info)
//! - `FOSSRADAR_DATA_DIR`: Data directory with allowlists and records (default: data)
//! - `GITHUB_TOKEN`: Service token for public reads (anonymous when unset)
//! - `GITHUB_REPO_OWNER` / `GITHUB_REPO_NAME`: Upstream data repository
//! - `WEBHOOK_SECRET`: Shared secret for webhook signature verification
//! - `ADMIN_API_KEY`: Static key for the admin endpoints
//! - `SITE_URL`: Public site URL used for sitemap pings
//! - `VISITOR_BACKEND`: `sqlite` (default) or `counter`
//! - `VISITOR_DB_PATH`: SQLite database path (sqlite backend)
//! - `COUNTER_API_BASE` / `COUNTER_API_WORKSPACE` / `COUNTER_API_TOKEN`:
//!   counter service settings (counter backend)

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use fossradar_api::{ApiConfig, ApiServer, AppState, ServiceConfig, DEFAULT_PORT};
use fossradar_core::{CounterApiStore, HitsStore, SqliteVisitorStore, VisitorStore};
use github_client::{GitHubClient, UpstreamRepo};
use project_store::{Allowlists, ProjectStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    // Load configuration from environment
    let config = ApiConfig {
        port: env::var("API_PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .context("Invalid API_PORT")?,
        host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
    };

    let data_dir =
        PathBuf::from(env::var("FOSSRADAR_DATA_DIR").unwrap_or_else(|_| "data".to_string()));
    let store = ProjectStore::new(data_dir.join("projects"));
    let allowlists = Allowlists::load(&data_dir)
        .with_context(|| format!("Failed to load allowlists from {}", data_dir.display()))?;

    let github = match env::var("GITHUB_TOKEN") {
        Ok(token) => GitHubClient::from_token(&token),
        Err(_) => GitHubClient::anonymous(),
    }
    .context("Failed to build GitHub client")?;

    let visitors = build_visitor_store()?;

    let upstream = UpstreamRepo::new(
        env::var("GITHUB_REPO_OWNER").unwrap_or_else(|_| "fossradar".to_string()),
        env::var("GITHUB_REPO_NAME").unwrap_or_else(|_| "fossradar".to_string()),
    );
    let site_url = env::var("SITE_URL").unwrap_or_else(|_| "https://fossradar.in".to_string());
    let service_config = ServiceConfig {
        upstream,
        webhook_secret: env::var("WEBHOOK_SECRET").ok(),
        admin_api_key: env::var("ADMIN_API_KEY").ok(),
        sitemap_url: format!("{}/sitemap.xml", site_url.trim_end_matches('/')),
    };

    let hits = HitsStore::new(data_dir.join("hits.json"));

    let state = AppState::new(store, allowlists, visitors, hits, github, service_config);
    let server = ApiServer::new(config, state);

    tracing::info!("Starting FOSSRadar API server");
    tracing::info!("Data directory: {}", data_dir.display());

    // Start server with graceful shutdown
    server.serve().await
}

/// Selects the visitor backend from the environment. The two backends are
/// alternatives, never composed.
fn build_visitor_store() -> anyhow::Result<Arc<dyn VisitorStore>> {
    let backend = env::var("VISITOR_BACKEND").unwrap_or_else(|_| "sqlite".to_string());
    match backend.as_str() {
        "counter" => {
            let base = env::var("COUNTER_API_BASE")
                .context("COUNTER_API_BASE is required for the counter backend")?;
            let workspace = env::var("COUNTER_API_WORKSPACE")
                .context("COUNTER_API_WORKSPACE is required for the counter backend")?;
            let token = env::var("COUNTER_API_TOKEN").ok();
            tracing::info!("Using the counter service visitor backend");
            Ok(Arc::new(CounterApiStore::new(base, workspace, token)?))
        }
        "sqlite" => {
            let db_path =
                env::var("VISITOR_DB_PATH").unwrap_or_else(|_| "data/visitors.db".to_string());
            tracing::info!(path = %db_path, "Using the SQLite visitor backend");
            Ok(Arc::new(SqliteVisitorStore::open(Path::new(&db_path))?))
        }
        other => anyhow::bail!("Unknown VISITOR_BACKEND \"{}\"", other),
    }
}
