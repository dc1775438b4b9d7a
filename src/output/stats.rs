//! Statistics over the checkpoint and configured sinks
//!
//! This module reads back what earlier runs left on disk and prints
//! run reports and sink summaries for the command line.

use crate::config::Config;
use crate::crawler::RunReport;
use crate::output::csv_output::count_csv_rows;
use crate::output::json_output::JsonSink;
use crate::output::SinkOutcome;
use crate::state::CheckpointStore;
use crate::storage::{load_database_statistics, open_database, DatabaseStatistics};
use crate::HarvestError;
use std::io::ErrorKind;
use std::path::Path;

/// What the checkpoint and each configured sink currently hold
#[derive(Debug, Clone, PartialEq)]
pub struct SinkStatistics {
    /// Last page recorded in the checkpoint, 0 if none
    pub checkpoint_last_page: u32,

    /// Data rows in the CSV file, `None` if no CSV sink is configured
    pub csv_rows: Option<usize>,

    /// Entries in the JSON array, `None` if no JSON sink is configured
    pub json_entries: Option<usize>,

    /// Product table summary, `None` if no database sink is configured
    pub database: Option<DatabaseStatistics>,
}

/// Loads statistics for every configured sink
///
/// Files that do not exist yet count as empty.
pub fn load_statistics(config: &Config) -> Result<SinkStatistics, HarvestError> {
    let checkpoint_last_page =
        CheckpointStore::new(&config.output.checkpoint_path).read_last_page();

    let csv_rows = match &config.output.csv_path {
        Some(path) => Some(match count_csv_rows(Path::new(path)) {
            Ok(rows) => rows,
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        }),
        None => None,
    };

    let json_entries = match &config.output.json_path {
        Some(path) => Some(JsonSink::new(path).load_entries()?.len()),
        None => None,
    };

    let database = match &config.output.database_path {
        Some(path) if Path::new(path).exists() => {
            let conn = open_database(Path::new(path))?;
            Some(load_database_statistics(&conn)?)
        }
        Some(_) => Some(DatabaseStatistics {
            rows: 0,
            first_scraped_at: None,
            last_scraped_at: None,
        }),
        None => None,
    };

    Ok(SinkStatistics {
        checkpoint_last_page,
        csv_rows,
        json_entries,
        database,
    })
}

/// Prints sink statistics to stdout in a formatted manner
pub fn print_statistics(stats: &SinkStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Checkpoint:");
    if stats.checkpoint_last_page == 0 {
        println!("  No pages completed yet; next run starts at page 1");
    } else {
        println!(
            "  Last completed page: {} (next run starts at page {})",
            stats.checkpoint_last_page,
            stats.checkpoint_last_page.saturating_add(1)
        );
    }
    println!();

    println!("Sinks:");
    if let Some(rows) = stats.csv_rows {
        println!("  CSV rows: {}", rows);
    }
    if let Some(entries) = stats.json_entries {
        println!("  JSON entries: {}", entries);
    }
    if let Some(db) = &stats.database {
        println!("  SQLite rows: {}", db.rows);
        if let (Some(first), Some(last)) = (&db.first_scraped_at, &db.last_scraped_at) {
            println!("  SQLite scraped between {} and {}", first, last);
        }
    }
}

/// Prints the outcome of a single run
pub fn print_run_report(report: &RunReport) {
    println!("=== Harvest Run ===\n");

    println!("  Termination: {}", report.termination);
    println!("  Started at page: {}", report.start_page);
    match report.last_completed_page {
        Some(page) => println!("  Last completed page: {}", page),
        None => println!("  Last completed page: none"),
    }
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Records collected: {}", report.records_collected);
    println!();

    println!("Sinks:");
    for sink in &report.sinks {
        match &sink.outcome {
            SinkOutcome::Written(count) => println!("  {}: wrote {} records", sink.sink, count),
            SinkOutcome::Failed(message) => println!("  {}: FAILED ({})", sink.sink, message),
            SinkOutcome::Skipped => println!("  {}: skipped", sink.sink),
        }
    }
}
