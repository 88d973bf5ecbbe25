//! Core services for the FOSSRadar directory.
//!
//! This crate ties the project store and the GitHub client together into the
//! behaviors the API and CLI expose: the submission pipeline that turns a
//! validated form payload into a pull request, the visitor and hit counters,
//! webhook signature verification, sitemap pings, the enrichment engine that
//! refreshes server-computed record fields, and PR-author verification.

pub mod enrich;
pub mod hits;
pub mod sitemap;
pub mod submission;
pub mod verify_author;
pub mod visitors;
pub mod webhook;

pub use enrich::{EnrichError, Enricher, EnrichmentOutcome, ProjectCache};
pub use hits::{HitsError, HitsStore};
pub use sitemap::{ping_search_engines, SitemapPingResults};
pub use submission::{SubmissionError, SubmissionPipeline};
pub use verify_author::{check_affiliation, verify_and_mark, AffiliationCheck, VerifyError};
pub use visitors::{
    CounterApiStore, SqliteVisitorStore, VisitorError, VisitorRecord, VisitorStatistics,
    VisitorStore,
};
pub use webhook::{verify_signature, PushCommit, PushEvent, PushRepository};
