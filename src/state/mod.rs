//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `CheckpointStore`: durable record of the last completed catalog page
//! - `RunState`: position of the controller within the per-page cycle
//! - `Termination`: the reason a run stopped

mod checkpoint;
mod run_state;

// Re-export main types
pub use checkpoint::{CheckpointError, CheckpointResult, CheckpointStore};
pub use run_state::{RunState, Termination};
