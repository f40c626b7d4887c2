use std::path::Path;

use anyhow::{Context, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Container formats whose internal keys can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyedFormat {
    Json,
    Csv,
    Parquet,
}

impl KeyedFormat {
    /// Detect the format from the file extension.
    ///
    /// * `.json`, `.tpd`  – keys of the top-level object
    /// * `.csv`           – header columns
    /// * `.parquet`, `.pq` – top-level schema fields
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" | "tpd" => Some(KeyedFormat::Json),
            "csv" => Some(KeyedFormat::Csv),
            "parquet" | "pq" => Some(KeyedFormat::Parquet),
            _ => None,
        }
    }
}

/// List the top-level internal keys of `path`, in file order.
pub fn list_keys(path: &Path, format: KeyedFormat) -> Result<Vec<String>> {
    match format {
        KeyedFormat::Json => json_keys(path),
        KeyedFormat::Csv => csv_keys(path),
        KeyedFormat::Parquet => parquet_keys(path),
    }
}

// ---------------------------------------------------------------------------
// Per-format readers
// ---------------------------------------------------------------------------

fn json_keys(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let obj = root
        .as_object()
        .context("Expected top-level JSON object")?;

    Ok(obj.keys().cloned().collect())
}

fn csv_keys(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?;

    Ok(headers
        .iter()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string())
        .collect())
}

/// Only the footer metadata is read, never the row groups.
fn parquet_keys(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    Ok(builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect())
}
