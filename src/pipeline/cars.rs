// src/pipeline/cars.rs
//! Ingest a directory of dealership exports (CSV, line-delimited JSON
//! and XML) into one car table, coerce year and price to numbers (bad
//! values become nulls) with prices rounded to two decimals, and write
//! the unified CSV artifact. Stage boundaries are journaled to the
//! progress log.

use crate::extract::{self, Dataset};
use crate::load;
use crate::progress::ProgressLog;
use crate::table::{Table, Value};
use crate::transform::{self, round2, Coercion};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DATA_DIR: &str = "data/cars";
pub const CSV_PATH: &str = "data/cars/transformed_data.csv";
pub const LOG_PATH: &str = "data/cars/log_file.txt";
/// The output artifact lives in the scanned directory, so the scan must
/// leave it out.
const OUTPUT_NAME: &str = "transformed_data.csv";

pub const DATASET: Dataset = Dataset {
    columns: &["car_model", "year_of_manufacture", "price", "fuel"],
    xml_record: "car",
};

/// Coerce year and price to numbers, nulling out unparseable values, and
/// round prices to two decimals.
pub fn transform(table: &mut Table) -> Result<()> {
    transform::coerce_int(table, "year_of_manufacture", Coercion::Null)?;
    transform::coerce_float(table, "price", Coercion::Null)?;
    table.map_column("price", |v| {
        Ok(match v.as_f64() {
            Some(x) => Value::Float(round2(x)),
            None => Value::Null,
        })
    })
}

/// Ingest, clean and persist the car table end to end.
pub fn run() -> Result<()> {
    fs::create_dir_all(DATA_DIR).context("creating data directory")?;
    let log = ProgressLog::new(LOG_PATH);
    log.record("ETL Job Started")?;

    log.record("Extract Phase Started")?;
    let mut table = extract::extract_dir(&DATASET, Path::new(DATA_DIR), Some(OUTPUT_NAME))?;
    info!(rows = table.len(), "extracted car rows");
    log.record("Extract Phase Ended")?;

    log.record("Transform Phase Started")?;
    transform(&mut table)?;
    log.record("Transform Phase Ended")?;

    log.record("Load Phase Started")?;
    load::write_csv(&table, Path::new(CSV_PATH))?;
    info!(path = CSV_PATH, "wrote CSV artifact");
    log.record("Load Phase Ended")?;

    log.record("ETL Job Ended")?;
    Ok(())
}
