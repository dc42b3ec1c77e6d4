// src/extract/mod.rs
//! File-sourced extraction: one directory in, one concatenated table out.
//!
//! Every `*.csv`, `*.json` and `*.xml` file in the scanned directory
//! contributes records to the same declared column set; the formats are
//! reconciled purely by matching column names.

pub mod xml;

use crate::table::{Record, Table, Value};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use glob::glob;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Fixed description of one file-sourced dataset.
#[derive(Debug, Clone, Copy)]
pub struct Dataset {
    /// Declared output columns, in order.
    pub columns: &'static [&'static str],
    /// Tag of one record element under the XML document root.
    pub xml_record: &'static str,
}

impl Dataset {
    pub fn empty_table(&self) -> Table {
        Table::new(self.columns.iter().copied())
    }
}

/// Scan `dir` for `*.csv`, `*.json` and `*.xml` files (in that order, each
/// alphabetically) and concatenate every record into one table. `skip`
/// names a file to leave out of the scan, typically the pipeline's own
/// output artifact when it lives in the same directory.
pub fn extract_dir(dataset: &Dataset, dir: &Path, skip: Option<&str>) -> Result<Table> {
    let mut out = dataset.empty_table();

    for pattern in ["*.csv", "*.json", "*.xml"] {
        let full = dir.join(pattern).to_string_lossy().into_owned();
        for entry in glob(&full).context("invalid glob pattern")? {
            let path = entry.context("reading glob entry")?;
            if let Some(skip_name) = skip {
                if path.file_name().and_then(|n| n.to_str()) == Some(skip_name) {
                    continue;
                }
            }

            let table = match pattern {
                "*.csv" => from_csv(dataset, &path)?,
                "*.json" => from_json(dataset, &path)?,
                _ => xml::from_xml(dataset, &path)?,
            };
            debug!(file = %path.display(), rows = table.len(), "extracted");
            out.append(table)?;
        }
    }

    Ok(out)
}

/// Read one CSV file with headers, matching columns by name. Declared
/// columns absent from the file come back null; extra file columns are
/// ignored.
pub fn from_csv(dataset: &Dataset, path: &Path) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("reading headers of {}", path.display()))?
        .clone();
    let positions: Vec<Option<usize>> = dataset
        .columns
        .iter()
        .map(|name| headers.iter().position(|h| h.trim() == *name))
        .collect();

    let mut table = dataset.empty_table();
    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        let row: Record = positions
            .iter()
            .map(|pos| match pos {
                Some(i) => record
                    .get(*i)
                    .map(|s| Value::Str(s.trim().to_string()))
                    .unwrap_or(Value::Null),
                None => Value::Null,
            })
            .collect();
        table.push(row)?;
    }
    Ok(table)
}

/// Read one line-delimited JSON file, one object per line, keyed by column
/// name. Blank lines are skipped; a malformed line aborts the run.
pub fn from_json(dataset: &Dataset, path: &Path) -> Result<Table> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut table = dataset.empty_table();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let object: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("parsing JSON line {} of {}", lineno + 1, path.display()))?;
        let row: Record = dataset
            .columns
            .iter()
            .map(|name| cell_from_json(object.get(*name)))
            .collect();
        table.push(row)?;
    }
    Ok(table)
}

fn cell_from_json(v: Option<&serde_json::Value>) -> Value {
    match v {
        None | Some(serde_json::Value::Null) => Value::Null,
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        Some(serde_json::Value::String(s)) => Value::Str(s.trim().to_string()),
        Some(other) => Value::Str(other.to_string()),
    }
}
