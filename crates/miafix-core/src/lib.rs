//! MIA Fixer Core - marks Missing In Action discs in Redump DAT files.
//!
//! The Redump wiki publishes, per system, a list of discs that are known to
//! exist but have not been dumped and verified yet. This crate matches those
//! lists against local DAT files and writes a copy of each DAT in which the
//! listed discs' `rom` records carry `mia="yes"`, so ROM managers can tell
//! them apart.
//!
//! # Example
//!
//! ```rust,ignore
//! use miafix_core::{
//!     discover_catalogs, CancellationToken, HttpClient, ReconcileOptions, Reconciler,
//!     RunStatistics,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> miafix_core::Result<()> {
//!     let sources = discover_catalogs(&["/path/to/dats"]);
//!     let fetcher = Arc::new(HttpClient::new()?);
//!     let mut reconciler = Reconciler::connect(fetcher, ReconcileOptions::default()).await?;
//!
//!     let mut stats = RunStatistics::new();
//!     reconciler.run(&sources, &mut stats, &CancellationToken::new()).await?;
//!     println!("{} discs updated", stats.summary().discs_updated);
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod matcher;
pub mod mia_list;
pub mod network;
pub mod outcome;
pub mod persist;
pub mod reconcile;
pub mod registry;
pub mod stats;
pub mod version;

pub use cancel::CancellationToken;
pub use catalog::{CatalogDocument, CatalogEntry, FileRecord};
pub use config::ReconcileOptions;
pub use discovery::{discover_catalogs, CatalogSource};
pub use error::{MiaFixError, Result};
pub use identity::resolve_system_name;
pub use matcher::{DiscOutcome, ExactTitleMatch, MatchReport, TitleMatcher};
pub use mia_list::{ListLayout, MiaList};
pub use network::{HttpClient, PageFetcher};
pub use outcome::{FileBucket, FileOutcome, Persisted, ProcessedFile, VersionBucket};
pub use reconcile::Reconciler;
pub use registry::{RegistryCategory, RegistryEntry, RegistryIndex};
pub use stats::{RunStatistics, RunSummary, WrittenOutput};
pub use version::{compare_versions, UnmatchedCause, VersionComparison};
