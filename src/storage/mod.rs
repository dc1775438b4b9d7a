//! Storage module for the relational record sink
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Transactional batch inserts of product records
//! - Reading back row counts for `--stats`

mod schema;
mod sqlite;

pub use schema::initialize_schema;
pub use sqlite::{load_database_statistics, open_database, SqliteSink};

/// Summary of the product table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStatistics {
    pub rows: u64,
    pub first_scraped_at: Option<String>,
    pub last_scraped_at: Option<String>,
}
