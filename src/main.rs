//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest catalog walker.

use anyhow::Context;
use catalog_harvest::config::{load_config_with_hash, Config};
use catalog_harvest::crawler::run_harvest;
use catalog_harvest::output::{load_statistics, print_run_report, print_statistics};
use catalog_harvest::state::CheckpointStore;
use catalog_harvest::url::render_page_url;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a resumable product catalog harvester
///
/// Catalog-Harvest walks a paginated product catalog one page at a time,
/// checkpoints every completed page, and saves the extracted product
/// records to CSV, JSON and SQLite when the run ends.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "A resumable product catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Reset the checkpoint and start again from page 1
    #[arg(long)]
    fresh: bool,

    /// Validate config and show which page would be fetched next
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show checkpoint position and sink totals, then exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, cli.fresh)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the next page
fn handle_dry_run(config: &Config, fresh: bool) -> anyhow::Result<()> {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Page URL template: {}", config.crawler.page_url_template);
    println!("  Max pages per run: {}", config.crawler.max_pages);
    println!("  Inter-page delay: {}ms", config.crawler.inter_page_delay_ms);
    println!("  Ready timeout: {}s", config.crawler.ready_timeout_secs);
    println!("  Ready poll interval: {}ms", config.crawler.ready_poll_interval_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nExtraction Rules:");
    println!("  Product container: {}", config.extraction.product_container);
    println!("  Brand: {}", config.extraction.brand);
    println!("  Product name: {}", config.extraction.product_name);
    println!("  Price container: {}", config.extraction.price_container);
    println!("  Former price: {}", config.extraction.former_price);
    println!("  Current price: {}", config.extraction.current_price);
    println!("  Discount: {}", config.extraction.discount);
    println!("  Next page: {}", config.extraction.next_page);

    println!("\nOutput:");
    println!("  Checkpoint: {}", config.output.checkpoint_path);
    if let Some(path) = &config.output.csv_path {
        println!("  CSV: {}", path);
    }
    if let Some(path) = &config.output.json_path {
        println!("  JSON: {}", path);
    }
    if let Some(path) = &config.output.database_path {
        println!("  SQLite: {}", path);
    }

    let next_page = if fresh {
        1
    } else {
        CheckpointStore::new(&config.output.checkpoint_path).next_page()
    };
    let next_url = render_page_url(&config.crawler.page_url_template, next_page)?;

    println!("\n✓ Configuration is valid");
    println!("✓ Would start at page {}: {}", next_page, next_url);

    Ok(())
}

/// Handles the --stats mode: shows checkpoint and sink totals
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let stats = load_statistics(config).context("Failed to read sink statistics")?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh harvest (ignoring previous checkpoint)");
    } else {
        tracing::info!("Starting harvest (will resume from checkpoint if present)");
    }

    let report = run_harvest(config, fresh, shutdown_signal())
        .await
        .context("Harvest failed")?;

    print_run_report(&report);

    if !report.is_success() {
        tracing::warn!("Run ended with {}; rerun to resume", report.termination);
    }
    if report.has_sink_failures() {
        tracing::warn!("At least one sink failed; see the run report above");
    }

    Ok(())
}

/// Completes when the process receives Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl-C received, finishing current step and saving");
}
