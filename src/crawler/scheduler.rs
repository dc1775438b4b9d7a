//! Page scheduling for a single run
//!
//! This module handles:
//! - Tracking which catalog page comes next
//! - Enforcing the per-run page budget
//! - Pacing fetches with a fixed delay between pages

use crate::config::CrawlerConfig;
use std::time::Duration;

/// Sequential page counter with a hard page budget
#[derive(Debug, Clone)]
pub struct PageScheduler {
    /// Page the run started on
    start_page: u32,

    /// Page currently being processed
    current: u32,

    /// Pages fetched successfully so far in this run
    pages_fetched: u32,

    /// Maximum number of pages fetched in one run
    max_pages: u32,

    /// Pause between two successful fetches
    delay: Duration,
}

impl PageScheduler {
    /// Creates a scheduler starting at `start_page`
    pub fn new(start_page: u32, config: &CrawlerConfig) -> Self {
        Self {
            start_page,
            current: start_page,
            pages_fetched: 0,
            max_pages: config.max_pages,
            delay: Duration::from_millis(config.inter_page_delay_ms),
        }
    }

    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    pub fn current_page(&self) -> u32 {
        self.current
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Records that the current page was fetched
    pub fn record_fetch(&mut self) {
        self.pages_fetched += 1;
    }

    /// Returns true once the run has fetched `max_pages` pages
    pub fn budget_exhausted(&self) -> bool {
        self.pages_fetched >= self.max_pages
    }

    /// Moves to the following page and returns its number
    pub fn advance(&mut self) -> u32 {
        self.current = self.current.saturating_add(1);
        self.current
    }

    /// Sleeps for the inter-page delay
    pub async fn wait_between_pages(&self) {
        if !self.delay.is_zero() {
            tracing::debug!("Waiting {:?} before page {}", self.delay, self.current);
            tokio::time::sleep(self.delay).await;
        }
    }
}
