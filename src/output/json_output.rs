//! Whole-document JSON sink
//!
//! The target holds a single JSON array. A flush reads the existing array,
//! appends the batch and rewrites the whole document through a temp file
//! and rename, so the cost grows with the size of the existing file.

use crate::output::traits::{RecordSink, SinkError, SinkResult};
use crate::output::ProductRecord;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Merges records into a JSON array document
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the entries already in the document; a missing or blank file has none
    pub fn load_entries(&self) -> SinkResult<Vec<Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Array(entries) => Ok(entries),
            other => Err(SinkError::Format {
                path: self.path.display().to_string(),
                message: format!("expected a JSON array, found {}", json_kind(&other)),
            }),
        }
    }

    fn write_entries(&self, entries: &[Value]) -> SinkResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut temp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "records.json".into());
        temp_name.push(".tmp");
        let temp_path = self.path.with_file_name(temp_name);

        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
            entries.serialize(&mut serializer)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl RecordSink for JsonSink {
    fn name(&self) -> &str {
        "json"
    }

    fn write_batch(&mut self, records: &[ProductRecord]) -> SinkResult<usize> {
        let mut entries = self.load_entries()?;
        let existing = entries.len();

        for record in records {
            entries.push(serde_json::to_value(record)?);
        }
        self.write_entries(&entries)?;

        tracing::info!(
            "Saved {} new records to JSON at {} ({} total)",
            records.len(),
            self.path.display(),
            existing + records.len()
        );
        Ok(records.len())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
