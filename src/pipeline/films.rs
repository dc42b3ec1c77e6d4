// src/pipeline/films.rs
//! Scrape the archived "100 Most Highly-Ranked Films" list, keep films
//! released since 2000 up to a fixed row limit, order them by their
//! Rotten Tomatoes rank, and persist the result as CSV and as the `films`
//! table of an embedded database.

use crate::fetch::{self, html};
use crate::load;
use crate::table::{Table, Value};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const URL: &str =
    "https://web.archive.org/web/20230902185655/https://en.everybodywiki.com/100_Most_Highly-Ranked_Films";
pub const CSV_PATH: &str = "data/films/films.csv";
pub const DB_PATH: &str = "data/films/films.db";
pub const TABLE_NAME: &str = "films";

const COLUMNS: [&str; 3] = ["Film", "Year", "Rotten Tomatoes' Top 100"];
const RANK_COLUMN: &str = "Rotten Tomatoes' Top 100";
/// Oldest release year kept.
const MIN_YEAR: i64 = 2000;
/// Most rows kept after filtering.
pub const ROW_LIMIT: usize = 25;

/// Rows of the first table body holding a film name plus numeric year and
/// rank cells. Rows missing those fields are dropped; the drop count is
/// surfaced once as a warning.
pub fn extract(page: &str) -> Result<Table> {
    let mut table = Table::new(COLUMNS);
    let mut skipped = 0usize;

    for cells in html::first_table_body(page) {
        if cells.is_empty() {
            continue; // header rows carry no td cells
        }
        if cells.len() < 4 {
            skipped += 1;
            continue;
        }
        let film = cells[1].text.clone();
        let year = html::clean_numeric(&cells[2].text).parse::<i64>();
        let rank = html::clean_numeric(&cells[3].text).parse::<i64>();
        match (year, rank) {
            (Ok(year), Ok(rank)) => {
                table.push(vec![Value::Str(film), Value::Int(year), Value::Int(rank)])?;
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "dropped rows without a numeric year and rank");
    }
    Ok(table)
}

/// Keep films from `MIN_YEAR` on, cap the row count, then order by rank
/// ascending.
pub fn transform(table: &mut Table) -> Result<()> {
    let year = table.column_index("Year")?;
    table.retain(|row| matches!(&row[year], Value::Int(y) if *y >= MIN_YEAR));
    table.truncate(ROW_LIMIT);
    table.sort_ascending_by(RANK_COLUMN)
}

/// Scrape, filter and persist the film table end to end.
pub fn run() -> Result<()> {
    let page = fetch::page_text(URL)?;
    let mut table = extract(&page)?;
    info!(rows = table.len(), "extracted film rows");

    transform(&mut table)?;
    info!(rows = table.len(), "transformed film rows");

    if let Some(parent) = Path::new(CSV_PATH).parent() {
        fs::create_dir_all(parent).context("creating output directory")?;
    }
    load::write_csv(&table, Path::new(CSV_PATH))?;
    info!(path = CSV_PATH, "wrote CSV artifact");

    let mut conn =
        Connection::open(DB_PATH).with_context(|| format!("opening {}", DB_PATH))?;
    load::replace_table(&mut conn, TABLE_NAME, &table)?;
    Ok(())
}
