use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod errors;

use commands::enrich_cmd::EnrichArgs;
use commands::validate_cmd::ValidateArgs;
use commands::verify_author_cmd::VerifyAuthorArgs;
use config::CliConfig;

/// FOSSRadar CLI: operational tooling for the project catalog
#[derive(Parser)]
#[command(name = "fossradar")]
#[command(about = "Operational tooling for the FOSSRadar project catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every record in the catalog
    Validate(ValidateArgs),

    /// Refresh server-computed record fields from GitHub
    Enrich(EnrichArgs),

    /// Check a PR author's affiliation and mark the record verified
    VerifyAuthor(VerifyAuthorArgs),

    /// Create the visitor database schema
    InitDb,

    /// Show the CLI version
    Version,
}

#[tokio::main]
async fn main() {
    // Initialize logging; command output goes to stdout, diagnostics to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("FOSSRADAR_LOG"))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env();

    let result = match &cli.command {
        Commands::Validate(args) => commands::validate_cmd::execute(args, &config).await,
        Commands::Enrich(args) => commands::enrich_cmd::execute(args, &config).await,
        Commands::VerifyAuthor(args) => commands::verify_author_cmd::execute(args, &config).await,
        Commands::InitDb => commands::init_db_cmd::execute(&config),
        Commands::Version => {
            println!("fossradar version {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}
