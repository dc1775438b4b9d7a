//! Crawler module for catalog page fetching and processing
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with a bounded readiness wait
//! - Record extraction from page markup
//! - Page budget and pacing
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{PaginationController, RunReport};
pub use fetcher::{build_http_client, user_agent_string, FetchResult, HttpSession, PageFetcher};
pub use parser::{
    has_products, parse_discount, parse_page, parse_price, CompiledRules, ParsedPage,
};
pub use scheduler::PageScheduler;

use crate::config::Config;
use crate::output::build_sinks;
use crate::state::CheckpointStore;
use crate::HarvestError;
use std::future::Future;

/// Runs a complete harvest over HTTP
///
/// This is the main entry point for a run. It will:
/// 1. Reset the checkpoint if `fresh` is set
/// 2. Open the HTTP session and the configured sinks
/// 3. Walk the catalog from the checkpointed page until a termination condition
/// 4. Flush every collected record to every sink
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::load_config;
/// use catalog_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_harvest(config, false, tokio::signal::ctrl_c()).await?;
/// println!("{}", report.termination);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest<S: Future>(
    config: Config,
    fresh: bool,
    shutdown: S,
) -> Result<RunReport, HarvestError> {
    let checkpoint = CheckpointStore::new(&config.output.checkpoint_path);
    if fresh {
        tracing::info!("Fresh run requested, resetting checkpoint");
        checkpoint.reset()?;
    }

    let rules = CompiledRules::compile(&config.extraction)?;
    let session = HttpSession::new(&config, rules.clone())?;
    let sinks = build_sinks(&config.output);

    let mut controller =
        PaginationController::new(config.crawler, rules, checkpoint, session, sinks);
    Ok(controller.run_until(shutdown).await)
}
