//! Enrichment command.
//!
//! Walks the catalog and refreshes the server-computed fields of every
//! record from live GitHub data, writing per-project caches alongside. A
//! token is required: an anonymous run would exhaust the unauthenticated
//! rate limit within a handful of projects.

use std::time::Duration;

use clap::Args;
use colored::Colorize;
use tracing::instrument;

use fossradar_core::Enricher;

use crate::config::CliConfig;
use crate::errors::Error;

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Seconds to pause between projects (rate-limit spacing)
    #[arg(long, default_value_t = 1)]
    pub pause: u64,
}

#[instrument(skip(config))]
pub async fn execute(args: &EnrichArgs, config: &CliConfig) -> Result<(), Error> {
    let client = config.authenticated_github_client()?;
    let store = config.store();

    println!("{}", "Enriching project records...".bold());

    let enricher = Enricher::new(&client, &store, &config.cache_dir)
        .with_pause(Duration::from_secs(args.pause));
    let outcomes = enricher.enrich_all().await?;

    let mut updated = 0;
    let mut skipped = 0;
    for outcome in &outcomes {
        match &outcome.error {
            None => {
                updated += 1;
                println!(
                    "{} {} (stars {}, good first issues {}, verified {})",
                    "updated".green(),
                    outcome.slug,
                    outcome.stars,
                    outcome.good_first_issues,
                    outcome.verified
                );
            }
            Some(error) => {
                skipped += 1;
                println!("{} {} ({})", "skipped".yellow(), outcome.slug, error);
            }
        }
    }

    println!(
        "{} {} updated, {} skipped",
        "Done:".bold(),
        updated,
        skipped
    );
    Ok(())
}
