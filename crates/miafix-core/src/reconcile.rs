//! The reconciliation pipeline.
//!
//! Each DAT passes through a fixed sequence of gates; the first one that
//! fires decides its [`FileOutcome`]:
//!
//! 1. filename already carries the completion suffix
//! 2. system not listed on the landing page
//! 3. system listed without a link
//! 4. MIA list page failed to load
//! 5. MIA list page lists no discs
//! 6. otherwise the DAT is read, matched, marked and written
//!
//! Files are processed one at a time. The only state carried between files
//! is the per-system page cache and the caller's [`RunStatistics`].

use crate::cancel::CancellationToken;
use crate::catalog::CatalogDocument;
use crate::config::ReconcileOptions;
use crate::discovery::CatalogSource;
use crate::identity::is_previously_completed;
use crate::matcher::{self, ExactTitleMatch, TitleMatcher};
use crate::mia_list::MiaList;
use crate::network::{resolve_link, PageFetcher};
use crate::outcome::{FileOutcome, Persisted, ProcessedFile};
use crate::persist::write_processed_copy;
use crate::registry::RegistryIndex;
use crate::stats::RunStatistics;
use crate::version::compare_versions;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A system's MIA list page, fetched at most once per run.
#[derive(Debug, Clone)]
enum DetailPage {
    Loaded(Arc<MiaList>),
    Unreachable(String),
}

/// Drives DATs through the reconciliation gates.
pub struct Reconciler {
    index: RegistryIndex,
    fetcher: Arc<dyn PageFetcher>,
    matcher: Box<dyn TitleMatcher>,
    options: ReconcileOptions,
    detail_pages: HashMap<String, DetailPage>,
}

impl Reconciler {
    /// Create a reconciler over an already-built registry index.
    pub fn new(index: RegistryIndex, fetcher: Arc<dyn PageFetcher>, options: ReconcileOptions) -> Self {
        Self {
            index,
            fetcher,
            matcher: Box::new(ExactTitleMatch),
            options,
            detail_pages: HashMap::new(),
        }
    }

    /// Fetch and parse the landing page, then create a reconciler.
    ///
    /// Failing to load or parse the landing page is fatal for the run.
    pub async fn connect(fetcher: Arc<dyn PageFetcher>, options: ReconcileOptions) -> Result<Self> {
        let landing_url = options.landing_url();
        info!("Accessing online MIA Lists...");
        debug!("url = {}", landing_url);

        let page = fetcher.fetch(&landing_url).await.map_err(|e| {
            error!("'{}' failed to load: {}", landing_url, e);
            e
        })?;
        let index = RegistryIndex::from_landing_page(&page)?;

        debug!("Registry index ({} systems):", index.len());
        for entry in index.sorted_entries() {
            debug!(
                "{} : {:?} {}",
                entry.system_name,
                entry.category,
                entry.link.as_deref().unwrap_or("<no link>")
            );
        }

        Ok(Self::new(index, fetcher, options))
    }

    /// Replace the title predicate.
    pub fn with_matcher(mut self, matcher: Box<dyn TitleMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Process every source in order, folding outcomes into `stats`.
    ///
    /// Stops with `MiaFixError::Interrupted` before the next file once
    /// `cancel` fires; files already finished stay recorded.
    pub async fn run(
        &mut self,
        sources: &[CatalogSource],
        stats: &mut RunStatistics,
        cancel: &CancellationToken,
    ) -> Result<()> {
        info!("Now processing DATs...");
        for source in sources {
            cancel.check()?;
            let processed = self.process_file(source).await;
            stats.record(&processed);
        }
        Ok(())
    }

    /// Classify one DAT, marking and writing it when it reaches the last gate.
    pub async fn process_file(&mut self, source: &CatalogSource) -> ProcessedFile {
        let outcome = self.classify(source).await;
        info!(
            file = %source.filename,
            system = %source.system_name,
            bucket = %outcome.bucket(),
            "{}",
            progress_message(&outcome)
        );
        ProcessedFile {
            source: source.clone(),
            outcome,
        }
    }

    async fn classify(&mut self, source: &CatalogSource) -> FileOutcome {
        let filename = &source.filename;
        let system = &source.system_name;

        if is_previously_completed(filename, &self.options.completed_filename_ending()) {
            debug!("File '{}' was updated previously.", filename);
            return FileOutcome::UpdatedPreviously;
        }

        let Some(entry) = self.index.lookup(system) else {
            debug!("File '{}' could not be matched with any MIA list.", filename);
            return FileOutcome::NoRegistryMatch;
        };

        let Some(link) = entry.link.clone() else {
            debug!(
                "System '{}' is listed on the systems page, but has no actively-linked MIA list.",
                system
            );
            return FileOutcome::NoLink;
        };

        let list = match self.detail_page(system, &link).await {
            DetailPage::Loaded(list) => list,
            DetailPage::Unreachable(cause) => {
                debug!("MIA list for '{}' isn't loading: {}", system, cause);
                return FileOutcome::LinkUnreachable { cause };
            }
        };

        if list.is_empty() {
            debug!("MIA List Version: {:?}", list.version);
            debug!("This system has no MIA discs listed.");
            return FileOutcome::EmptyList {
                registry_version: list.version.clone(),
            };
        }

        self.reconcile_document(source, &list)
    }

    /// Gate 6: read, compare versions, match, mark and persist.
    fn reconcile_document(&self, source: &CatalogSource, list: &MiaList) -> FileOutcome {
        let mut document = match CatalogDocument::read(&source.path) {
            Ok(document) => document,
            Err(e) => {
                warn!("Could not read '{}': {}", source.filename, e);
                return FileOutcome::CatalogUnreadable {
                    cause: e.to_string(),
                };
            }
        };

        let catalog_version = document.version().map(str::to_string);
        let comparison = compare_versions(catalog_version.as_deref(), list.timestamp.as_deref());
        debug!("MIA List Version: {:?}", list.version);
        debug!(
            "DAT Version: {} ({})",
            source.system_name,
            catalog_version.as_deref().unwrap_or("<none>")
        );
        debug!("The following discs are being updated...");

        let report = match matcher::apply(&mut document, list, self.matcher.as_ref(), comparison) {
            Ok(report) => report,
            Err(e) => {
                warn!("Could not update '{}': {}", source.filename, e);
                return FileOutcome::CatalogUnreadable {
                    cause: e.to_string(),
                };
            }
        };
        debug!("        --{}/{} discs updated.", report.updated, report.total);

        let persisted = match write_processed_copy(
            &document,
            &source.path,
            &self.options.completion_suffix,
        ) {
            Ok(path) => Persisted::Written(path),
            Err(e) => {
                error!("Failed to write processed copy of '{}': {}", source.filename, e);
                Persisted::Failed(e.to_string())
            }
        };

        FileOutcome::Reconciled {
            comparison,
            catalog_version,
            registry_version: list.version.clone(),
            report,
            persisted,
        }
    }

    async fn detail_page(&mut self, system: &str, link: &str) -> DetailPage {
        if let Some(page) = self.detail_pages.get(system) {
            return page.clone();
        }

        let page = match resolve_link(&self.options.registry_base_url, link) {
            Ok(url) => {
                debug!("System '{}' has an active MIA list. Opening '{}'...", system, url);
                match self.fetcher.fetch(&url).await {
                    Ok(html) => DetailPage::Loaded(Arc::new(MiaList::parse(&html))),
                    Err(e) => {
                        if e.is_retryable() {
                            warn!("MIA list for '{}' may be temporarily unavailable: {}", system, e);
                        } else {
                            warn!("MIA list for '{}' failed to load: {}", system, e);
                        }
                        DetailPage::Unreachable(e.to_string())
                    }
                }
            }
            Err(e) => DetailPage::Unreachable(e.to_string()),
        };

        self.detail_pages.insert(system.to_string(), page.clone());
        page
    }
}

fn progress_message(outcome: &FileOutcome) -> &'static str {
    match outcome {
        FileOutcome::LinkUnreachable { .. } => "Error: MIA list failed to load.",
        FileOutcome::CatalogUnreadable { .. } => "Error: DAT could not be read.",
        FileOutcome::Reconciled {
            persisted: Persisted::Failed(_),
            ..
        } => "Error: updated DAT could not be written.",
        FileOutcome::Reconciled { .. } => "Updated.",
        _ => "No update needed.",
    }
}
