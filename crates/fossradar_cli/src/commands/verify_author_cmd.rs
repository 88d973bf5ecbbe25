//! PR-author verification command.
//!
//! Run against a merged submission: checks how the pull request author
//! relates to the project repository and flips the record's `verified` flag
//! when any affiliation signal holds. Exits non-zero for an unaffiliated
//! author so CI can gate on it.

use clap::Args;
use colored::Colorize;
use tracing::instrument;

use fossradar_core::verify_and_mark;

use crate::config::CliConfig;
use crate::errors::Error;

#[derive(Args, Debug)]
pub struct VerifyAuthorArgs {
    /// GitHub login of the pull request author
    pub author: String,

    /// Slug of the submitted project
    pub slug: String,
}

#[instrument(skip(config))]
pub async fn execute(args: &VerifyAuthorArgs, config: &CliConfig) -> Result<(), Error> {
    let client = config.github_client()?;
    let store = config.store();

    let (check, changed) = verify_and_mark(&client, &store, &args.author, &args.slug).await?;

    if !check.is_affiliated() {
        println!(
            "{} {} has no affiliation with the repository behind \"{}\"",
            "not affiliated:".red().bold(),
            args.author,
            args.slug
        );
        return Err(Error::NotAffiliated {
            author: args.author.clone(),
            slug: args.slug.clone(),
        });
    }

    println!(
        "{} {} ({})",
        "affiliated:".green().bold(),
        args.author,
        check.reasons().join(", ")
    );
    if changed {
        println!("Marked \"{}\" as verified.", args.slug);
    } else {
        println!("\"{}\" was already verified.", args.slug);
    }
    Ok(())
}
