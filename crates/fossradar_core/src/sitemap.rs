//! Search-engine sitemap pings.

use serde::Serialize;
use tracing::{info, warn};

#[cfg(test)]
#[path = "sitemap_tests.rs"]
mod tests;

/// Which engines acknowledged the ping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SitemapPingResults {
    pub google: bool,
    pub bing: bool,
}

/// Notifies Google and Bing that the sitemap changed.
///
/// Each ping is best-effort: a failure is logged and reflected in the result,
/// never propagated. One engine failing does not stop the other.
pub async fn ping_search_engines(http: &reqwest::Client, sitemap_url: &str) -> SitemapPingResults {
    let mut results = SitemapPingResults::default();

    results.google = ping_engine(
        http,
        "Google",
        "https://www.google.com/ping",
        sitemap_url,
    )
    .await;
    results.bing = ping_engine(http, "Bing", "https://www.bing.com/ping", sitemap_url).await;

    results
}

async fn ping_engine(
    http: &reqwest::Client,
    engine: &str,
    endpoint: &str,
    sitemap_url: &str,
) -> bool {
    let result = http
        .get(endpoint)
        .query(&[("sitemap", sitemap_url)])
        .send()
        .await;

    match result {
        Ok(response) => {
            let ok = response.status().is_success();
            info!(engine = engine, status = %response.status(), "Pinged search engine about sitemap update");
            ok
        }
        Err(error) => {
            warn!(engine = engine, error = %error, "Failed to ping search engine");
            false
        }
    }
}
