//! Record sink trait and error types
//!
//! A sink receives the whole batch of records collected during a run, once,
//! when the run ends. Each sink owns its own durability contract.

use crate::output::ProductRecord;
use thiserror::Error;

/// Errors that can occur while persisting a batch
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unexpected content in {path}: {message}")]
    Format { path: String, message: String },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// A durable destination for product records
///
/// Implementations must not keep references to the batch after
/// `write_batch` returns.
pub trait RecordSink: Send {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Persists the batch, returning the number of records written
    fn write_batch(&mut self, records: &[ProductRecord]) -> SinkResult<usize>;
}

/// Outcome of flushing a run's records to one sink
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOutcome {
    /// The sink accepted this many records
    Written(usize),

    /// The sink failed; nothing from this run should be assumed persisted there
    Failed(String),

    /// The run collected no records, so the sink was not invoked
    Skipped,
}

/// Per-sink line of a run report
#[derive(Debug, Clone, PartialEq)]
pub struct SinkReport {
    pub sink: String,
    pub outcome: SinkOutcome,
}

impl SinkReport {
    /// Returns true if the sink raised an error during the flush
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, SinkOutcome::Failed(_))
    }
}
