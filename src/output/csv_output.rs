//! Append-only CSV sink
//!
//! Rows are appended to the end of the file; a header row is written only
//! when the file is new or empty. Existing rows are never read back, so the
//! cost of a flush depends only on the size of the batch.

use crate::output::record::COLUMNS;
use crate::output::traits::{RecordSink, SinkResult};
use crate::output::ProductRecord;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const SEPARATOR: char = ',';

/// Appends records to a CSV file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    fn write_batch(&mut self, records: &[ProductRecord]) -> SinkResult<usize> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = BufWriter::new(file);
        if needs_header {
            write_row(&mut writer, &COLUMNS)?;
        }
        for record in records {
            write_row(&mut writer, &record.to_csv_fields())?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;

        tracing::info!(
            "Appended {} records to CSV at {}",
            records.len(),
            self.path.display()
        );
        Ok(records.len())
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes a single CSV row, quoting cells that need it
fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, "{}", SEPARATOR)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Counts data rows (excluding the header) in a CSV file written by this sink
///
/// Line breaks inside quoted cells do not end a row.
pub fn count_csv_rows(path: &Path) -> io::Result<usize> {
    let text = fs::read_to_string(path)?;
    let mut rows: usize = 0;
    let mut in_quotes = false;
    let mut row_has_content = false;

    for ch in text.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                row_has_content = true;
            }
            '\n' if !in_quotes => {
                if row_has_content {
                    rows += 1;
                }
                row_has_content = false;
            }
            '\r' if !in_quotes => {}
            _ => row_has_content = true,
        }
    }
    if row_has_content {
        rows += 1;
    }

    Ok(rows.saturating_sub(1))
}
