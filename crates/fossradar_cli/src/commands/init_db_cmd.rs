//! Visitor database setup command.

use colored::Colorize;

use fossradar_core::SqliteVisitorStore;

use crate::config::CliConfig;
use crate::errors::Error;

/// Creates the visitor database file, its table and indexes. Idempotent.
pub fn execute(config: &CliConfig) -> Result<(), Error> {
    SqliteVisitorStore::open(&config.db_path)?;
    println!(
        "{} {}",
        "Visitor database ready at".green(),
        config.db_path.display()
    );
    Ok(())
}
