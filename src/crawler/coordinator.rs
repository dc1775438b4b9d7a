//! Pagination controller - main harvest orchestration logic
//!
//! This module contains the page loop that coordinates one run:
//! - Resuming from the checkpoint
//! - Fetching and extracting each catalog page in turn
//! - Checkpointing after every completed page
//! - Deciding whether to continue, and flushing records to every sink at the end

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchResult, PageFetcher};
use crate::crawler::parser::{parse_page, CompiledRules};
use crate::crawler::scheduler::PageScheduler;
use crate::output::{flush_to_sinks, ProductRecord, RecordSink, SinkReport};
use crate::state::{CheckpointStore, RunState, Termination};
use crate::url::{render_page_url, resolve_link};
use std::future::Future;

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Page the run started on
    pub start_page: u32,

    /// Last page whose checkpoint was written during this run
    pub last_completed_page: Option<u32>,

    /// Pages fetched successfully
    pub pages_fetched: u32,

    /// Records accumulated across all fetched pages
    pub records_collected: usize,

    /// Why the run stopped
    pub termination: Termination,

    /// Outcome of the final flush, one entry per sink
    pub sinks: Vec<SinkReport>,
}

impl RunReport {
    /// Returns true if the run ended because the catalog or the page budget ran out
    pub fn is_success(&self) -> bool {
        self.termination.is_success()
    }

    /// Returns true if any sink failed during the final flush
    pub fn has_sink_failures(&self) -> bool {
        self.sinks.iter().any(SinkReport::is_failure)
    }
}

/// Drives one run from the checkpointed page to termination
///
/// The controller owns the fetch session and the sinks for the duration of
/// the run. Pages are processed strictly one after another.
pub struct PaginationController<F: PageFetcher> {
    crawler: CrawlerConfig,
    rules: CompiledRules,
    checkpoint: CheckpointStore,
    fetcher: F,
    sinks: Vec<Box<dyn RecordSink>>,
    state: RunState,
}

impl<F: PageFetcher> PaginationController<F> {
    pub fn new(
        crawler: CrawlerConfig,
        rules: CompiledRules,
        checkpoint: CheckpointStore,
        fetcher: F,
        sinks: Vec<Box<dyn RecordSink>>,
    ) -> Self {
        Self {
            crawler,
            rules,
            checkpoint,
            fetcher,
            sinks,
            state: RunState::Init,
        }
    }

    /// Current position in the run's state machine
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs until the catalog, the page budget or the fetch session gives out
    pub async fn run(&mut self) -> RunReport {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Runs like [`run`](Self::run), stopping early once `shutdown` completes
    ///
    /// Shutdown is observed while a page is being fetched and during the
    /// inter-page delay. The accumulated records are flushed in every case.
    pub async fn run_until<S: Future>(&mut self, shutdown: S) -> RunReport {
        tokio::pin!(shutdown);

        self.transition(RunState::Init);
        let mut scheduler = PageScheduler::new(self.checkpoint.next_page(), &self.crawler);
        let mut records: Vec<ProductRecord> = Vec::new();
        let mut last_completed_page = None;

        tracing::info!("Starting harvest at page {}", scheduler.start_page());

        let termination = loop {
            let page = scheduler.current_page();
            self.transition(RunState::Fetching { page });

            let url = match render_page_url(&self.crawler.page_url_template, page) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!("Cannot build URL for page {}: {}", page, e);
                    break Termination::FetchTimeout;
                }
            };
            tracing::info!("Fetching page {}: {}", page, url);

            let fetched = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::warn!("Shutdown requested while fetching page {}", page);
                    break Termination::Interrupted;
                }
                result = self.fetcher.fetch(&url) => result,
            };

            let markup = match fetched {
                FetchResult::Success { markup, .. } => markup,
                FetchResult::Timeout { url } => {
                    tracing::warn!("Page {} never became ready: {}", page, url);
                    break Termination::FetchTimeout;
                }
            };
            scheduler.record_fetch();

            self.transition(RunState::Extracting { page });
            let parsed = parse_page(&markup, &self.rules);
            tracing::info!("Page {}: extracted {} records", page, parsed.records.len());
            records.extend(parsed.records);

            self.transition(RunState::Persisting { page });
            if let Err(e) = self.checkpoint.write_last_page(page) {
                tracing::error!("Failed to checkpoint page {}: {}", page, e);
                break Termination::CheckpointFailed;
            }
            last_completed_page = Some(page);

            self.transition(RunState::Deciding { page });
            if scheduler.budget_exhausted() {
                break Termination::MaxPagesReached;
            }

            let Some(href) = parsed.next_page else {
                break Termination::NoMorePages;
            };
            match resolve_link(&href, &url) {
                Some(next) => tracing::debug!("Next page link: {}", next),
                None => {
                    tracing::info!("Next page link {:?} does not lead anywhere", href);
                    break Termination::NoMorePages;
                }
            }

            scheduler.advance();
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::warn!("Shutdown requested between pages");
                    break Termination::Interrupted;
                }
                _ = scheduler.wait_between_pages() => {}
            }
        };

        self.transition(RunState::Terminated(termination));
        if termination.is_success() {
            tracing::info!("Harvest finished: {}", termination);
        } else {
            tracing::warn!("Harvest stopped early: {}", termination);
        }

        let sinks = flush_to_sinks(&mut self.sinks, &records);
        self.fetcher.close().await;

        RunReport {
            start_page: scheduler.start_page(),
            last_completed_page,
            pages_fetched: scheduler.pages_fetched(),
            records_collected: records.len(),
            termination,
            sinks,
        }
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!("State {} -> {}", self.state, next);
        self.state = next;
    }
}
