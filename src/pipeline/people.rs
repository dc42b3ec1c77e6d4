// src/pipeline/people.rs
//! Ingest a directory of body-measurement files (CSV, line-delimited
//! JSON and XML) into one table, convert heights from inches to meters
//! and weights from pounds to kilograms (two-decimal rounding), and
//! write the unified CSV artifact. Stage boundaries are journaled to the
//! progress log.

use crate::extract::{self, Dataset};
use crate::load;
use crate::progress::ProgressLog;
use crate::table::Table;
use crate::transform::{self, units, Coercion};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DATA_DIR: &str = "data/people";
pub const CSV_PATH: &str = "data/people/transformed_data.csv";
pub const LOG_PATH: &str = "data/people/log_file.txt";
const OUTPUT_NAME: &str = "transformed_data.csv";

pub const DATASET: Dataset = Dataset {
    columns: &["name", "height", "weight"],
    xml_record: "person",
};

/// Heights arrive in inches and weights in pounds; convert to meters and
/// kilograms, rounded to two decimals. A non-numeric measurement aborts
/// the run.
pub fn transform(table: &mut Table) -> Result<()> {
    transform::coerce_float(table, "height", Coercion::Abort)?;
    transform::coerce_float(table, "weight", Coercion::Abort)?;
    units::scale_column(table, "height", units::METERS_PER_INCH)?;
    units::scale_column(table, "weight", units::KILOGRAMS_PER_POUND)
}

/// Ingest, convert and persist the measurement table end to end.
pub fn run() -> Result<()> {
    fs::create_dir_all(DATA_DIR).context("creating data directory")?;
    let log = ProgressLog::new(LOG_PATH);
    log.record("ETL Job Started")?;

    log.record("Extract Phase Started")?;
    let mut table = extract::extract_dir(&DATASET, Path::new(DATA_DIR), Some(OUTPUT_NAME))?;
    info!(rows = table.len(), "extracted measurement rows");
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
