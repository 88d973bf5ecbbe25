//! Catalog validation command.
//!
//! Loading the catalog already fail-hards on schema violations, duplicate
//! slugs/repositories and filename mismatches. This command layers the
//! checks that need context the store does not have: allowlist membership,
//! logo files on disk, and (unless `--offline`) repository accessibility and
//! the directory topic on GitHub.

use clap::Args;
use colored::Colorize;
use tracing::instrument;

use github_client::{GitHubClient, DIRECTORY_TOPIC};
use project_store::{parse_github_url, Allowlists, StoredProject};

use crate::config::CliConfig;
use crate::errors::Error;

#[cfg(test)]
#[path = "validate_cmd_tests.rs"]
mod tests;

/// Logo files larger than this are flagged; they slow the catalog pages.
const MAX_LOGO_BYTES: u64 = 200 * 1024;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Skip the GitHub accessibility and topic checks
    #[arg(long)]
    pub offline: bool,
}

/// Problems found across the catalog, split by severity. Warnings do not
/// fail the run; errors do.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn error(&mut self, slug: &str, message: impl Into<String>) {
        self.errors.push(format!("{}: {}", slug, message.into()));
    }

    fn warning(&mut self, slug: &str, message: impl Into<String>) {
        self.warnings.push(format!("{}: {}", slug, message.into()));
    }
}

#[instrument(skip(config))]
pub async fn execute(args: &ValidateArgs, config: &CliConfig) -> Result<(), Error> {
    println!("{}", "Validating project catalog...".bold());

    let store = config.store();
    let projects = store.load_all()?;
    println!(
        "Loaded {} record(s) from {}",
        projects.len(),
        store.dir().display()
    );

    let allowlists = config.allowlists()?;
    let mut report = ValidationReport::default();

    for stored in &projects {
        check_record(&mut report, &allowlists, config, stored);
    }

    if !args.offline {
        let client = config.github_client()?;
        for stored in &projects {
            check_repository(&mut report, &client, stored).await;
        }
    }

    print_report(&report);

    if !report.errors.is_empty() {
        return Err(Error::ValidationFailed(report.errors.len()));
    }
    Ok(())
}

/// Allowlist and logo-file checks for one record.
fn check_record(
    report: &mut ValidationReport,
    allowlists: &Allowlists,
    config: &CliConfig,
    stored: &StoredProject,
) {
    let project = &stored.project;
    let slug = &project.slug;

    let invalid_tags = allowlists.invalid_tags(&project.tags);
    if !invalid_tags.is_empty() {
        report.error(slug, format!("tags not on the allowlist: {}", invalid_tags.join(", ")));
    }

    if !allowlists.validate_license(&project.license) {
        report.error(
            slug,
            format!("license \"{}\" is not an OSI-approved identifier", project.license),
        );
    }

    if !allowlists.validate_category(&project.category) {
        report.error(slug, format!("unknown category \"{}\"", project.category));
    }

    if let Some(logo) = &project.logo {
        let path = config.public_dir.join(logo.trim_start_matches('/'));
        match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > MAX_LOGO_BYTES => {
                report.warning(
                    slug,
                    format!("logo is {} KiB (over the {} KiB guideline)", meta.len() / 1024, MAX_LOGO_BYTES / 1024),
                );
            }
            Ok(_) => {}
            Err(_) => {
                report.warning(slug, format!("logo file {} does not exist", path.display()));
            }
        }
    }
}

/// Remote checks for one record, each its own best-effort call.
async fn check_repository(
    report: &mut ValidationReport,
    client: &GitHubClient,
    stored: &StoredProject,
) {
    let project = &stored.project;
    let slug = &project.slug;

    let Some((owner, repo)) = parse_github_url(&project.repo) else {
        report.error(slug, format!("repository URL {} is not a GitHub URL", project.repo));
        return;
    };

    if !client.is_repo_accessible(&owner, &repo).await {
        report.error(slug, "repository is missing or not public");
        return;
    }

    match client.has_topic(&owner, &repo, DIRECTORY_TOPIC).await {
        Ok(true) => {}
        Ok(false) => {
            report.warning(slug, format!("repository is missing the `{}` topic", DIRECTORY_TOPIC));
        }
        Err(_) => {
            report.warning(slug, "could not check repository topics");
        }
    }
}

fn print_report(report: &ValidationReport) {
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    for error in &report.errors {
        println!("{} {}", "error:".red().bold(), error);
    }

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("{}", "All records are valid.".green().bold());
    } else {
        println!(
            "{} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
    }
}
