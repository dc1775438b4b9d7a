//! Database schema definitions
//!
//! This module contains the SQL schema for the product table.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per product observation; scraped_at is the insertion time
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    brand TEXT,
    product_name TEXT,
    former_price REAL,
    current_price REAL,
    discount INTEGER,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_scraped_at ON products(scraped_at);
CREATE INDEX IF NOT EXISTS idx_products_brand ON products(brand);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
