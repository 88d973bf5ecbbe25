//! Command modules for the FOSSRadar CLI.
//!
//! Each submodule handles one operational command:
//!
//! - `validate_cmd`: schema, allowlist, logo and repository checks over the
//!   whole catalog
//! - `enrich_cmd`: refreshes server-computed record fields from GitHub
//! - `verify_author_cmd`: PR-author affiliation check and `verified` flip
//! - `init_db_cmd`: visitor database schema setup

pub mod enrich_cmd;
pub mod init_db_cmd;
pub mod validate_cmd;
pub mod verify_author_cmd;
