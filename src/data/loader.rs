use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{FieldValue, FurnaceDataset, HeatRecord};

/// Dispatch failure: the only loader error that is worth matching on.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a furnace export from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row, one heat per row (spreadsheet "save as CSV")
/// * `.json` – records-oriented array `[{ "colada": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<FurnaceDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => bail!(FormatError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every cell type-guessed.
/// Empty cells become `Null`, so a half-filled export loads fine and the
/// missing measurements surface as "unknown" later in the pipeline.
fn load_csv(path: &Path) -> Result<FurnaceDataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// CSV from any reader (in-memory sources, tests).
pub fn load_csv_reader<R: Read>(rdr: R) -> Result<FurnaceDataset> {
    read_csv(csv::Reader::from_reader(rdr))
}

fn read_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<FurnaceDataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut fields = BTreeMap::new();
        for (col_idx, value) in row.iter().enumerate() {
            let Some(col_name) = headers.get(col_idx) else {
                bail!("CSV row {row_no}: more cells than header columns");
            };
            fields.insert(col_name.clone(), guess_field_type(value));
        }
        records.push(HeatRecord::new(fields));
    }

    Ok(FurnaceDataset::from_records(records))
}

fn guess_field_type(s: &str) -> FieldValue {
    let s = s.trim();
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return FieldValue::Float(f);
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    FieldValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "colada": 7001, "fecha_colada": 45000.25, "kwh_total": 1000.0, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<FurnaceDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    load_json_str(&text)
}

/// JSON from a string (in-memory sources, tests).
pub fn load_json_str(text: &str) -> Result<FurnaceDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut fields = BTreeMap::new();
        for (key, val) in obj {
            fields.insert(key.clone(), json_to_field(val));
        }
        records.push(HeatRecord::new(fields));
    }

    Ok(FurnaceDataset::from_records(records))
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}
