//! Output module for persisting harvested records
//!
//! This module handles:
//! - The product record shared by every sink
//! - Append-only CSV and whole-document JSON sinks
//! - Flushing a run's records to every configured sink in isolation
//! - Reading back sink statistics

mod csv_output;
mod json_output;
mod record;
pub mod stats;
mod traits;

pub use csv_output::{count_csv_rows, CsvSink};
pub use json_output::JsonSink;
pub use record::{ProductRecord, COLUMNS};
pub use stats::{load_statistics, print_run_report, print_statistics, SinkStatistics};
pub use traits::{RecordSink, SinkError, SinkOutcome, SinkReport, SinkResult};

use crate::config::OutputConfig;
use crate::storage::SqliteSink;

/// Builds the sinks named in the output configuration
///
/// Sinks are returned in a fixed order: CSV, JSON, SQLite.
pub fn build_sinks(output: &OutputConfig) -> Vec<Box<dyn RecordSink>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();

    if let Some(path) = &output.csv_path {
        sinks.push(Box::new(CsvSink::new(path)));
    }
    if let Some(path) = &output.json_path {
        sinks.push(Box::new(JsonSink::new(path)));
    }
    if let Some(path) = &output.database_path {
        sinks.push(Box::new(SqliteSink::new(path)));
    }

    sinks
}

/// Writes the run's records to every sink
///
/// A failing sink is logged and reported; it never prevents the remaining
/// sinks from being attempted. When there are no records no sink is invoked.
pub fn flush_to_sinks(
    sinks: &mut [Box<dyn RecordSink>],
    records: &[ProductRecord],
) -> Vec<SinkReport> {
    if records.is_empty() {
        tracing::info!("No data collected. Nothing saved.");
        return sinks
            .iter()
            .map(|sink| SinkReport {
                sink: sink.name().to_string(),
                outcome: SinkOutcome::Skipped,
            })
            .collect();
    }

    let mut reports = Vec::with_capacity(sinks.len());
    for sink in sinks.iter_mut() {
        let outcome = match sink.write_batch(records) {
            Ok(count) => SinkOutcome::Written(count),
            Err(e) => {
                tracing::error!("Failed to save records to {} sink: {}", sink.name(), e);
                SinkOutcome::Failed(e.to_string())
            }
        };
        reports.push(SinkReport {
            sink: sink.name().to_string(),
            outcome,
        });
    }
    reports
}
