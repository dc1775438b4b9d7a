//! SQLite record sink
//!
//! Each flush opens its own connection and writes the whole batch inside a
//! single transaction: one INSERT per record, one COMMIT at the end. If any
//! insert fails the transaction is rolled back, so a batch lands completely
//! or not at all.

use crate::output::{ProductRecord, RecordSink, SinkResult};
use crate::storage::schema::initialize_schema;
use crate::storage::DatabaseStatistics;
use chrono::Utc;
use rusqlite::{params, Connection, Transaction};
use std::path::{Path, PathBuf};

const INSERT_SQL: &str = "INSERT INTO products
    (brand, product_name, former_price, current_price, discount, scraped_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Opens (creating if needed) the product database at `path`
pub fn open_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
    ",
    )?;

    initialize_schema(&conn)?;
    Ok(conn)
}

/// Writes record batches into the `products` table
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for SqliteSink {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn write_batch(&mut self, records: &[ProductRecord]) -> SinkResult<usize> {
        let mut conn = open_database(&self.path)?;
        let tx = conn.transaction()?;

        match insert_records(&tx, records) {
            Ok(count) => {
                tx.commit()?;
                tracing::info!(
                    "Saved {} records to SQLite at {}",
                    count,
                    self.path.display()
                );
                Ok(count)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!("Rollback failed after insert error: {}", rollback_err);
                }
                Err(e.into())
            }
        }
    }
}

fn insert_records(
    tx: &Transaction<'_>,
    records: &[ProductRecord],
) -> Result<usize, rusqlite::Error> {
    let mut stmt = tx.prepare(INSERT_SQL)?;
    for record in records {
        stmt.execute(params![
            record.brand,
            record.product_name,
            record.former_price,
            record.current_price,
            record.discount,
            Utc::now().to_rfc3339(),
        ])?;
    }
    Ok(records.len())
}

/// Reads row count and scrape time range from the product database
pub fn load_database_statistics(conn: &Connection) -> Result<DatabaseStatistics, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*), MIN(scraped_at), MAX(scraped_at) FROM products",
        [],
        |row| {
            Ok(DatabaseStatistics {
                rows: row.get::<_, i64>(0)? as u64,
                first_scraped_at: row.get(1)?,
                last_scraped_at: row.get(2)?,
            })
        },
    )
}
