// src/pipeline/banks.rs
//! Scrape the archived "List of largest banks" page, convert the USD
//! market capitalization into GBP, EUR and INR with rates from a side
//! CSV, persist the result as CSV and as the `largest_banks` table, then
//! run the fixed verification queries. Stage boundaries are journaled to
//! the progress log.

use crate::fetch::{self, html};
use crate::load;
use crate::progress::ProgressLog;
use crate::table::{Table, Value};
use crate::transform::currency::{self, ExchangeRates};
use crate::transform::{self, Coercion};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";
pub const DATA_DIR: &str = "data/banks";
pub const EXCHANGE_RATE_CSV: &str = "data/banks/exchange_rate.csv";
pub const CSV_PATH: &str = "data/banks/largest_banks_data.csv";
pub const DB_PATH: &str = "data/banks/banks.db";
pub const TABLE_NAME: &str = "largest_banks";
pub const LOG_PATH: &str = "data/banks/code_log.txt";

const EXTRACT_COLUMNS: [&str; 2] = ["Name", "MC_USD_Billion"];
const USD_COLUMN: &str = "MC_USD_Billion";

/// Derived column name and the currency code that prices it.
const DERIVED: [(&str, &str); 3] = [
    ("MC_GBP_Billion", "GBP"),
    ("MC_EUR_Billion", "EUR"),
    ("MC_INR_Billion", "INR"),
];

/// Fixed verification queries run after the load.
const QUERIES: [&str; 3] = [
    "SELECT * FROM largest_banks",
    "SELECT AVG(MC_GBP_Billion) FROM largest_banks",
    "SELECT Name FROM largest_banks LIMIT 5",
];

/// Bank name and USD market cap from the first table body. The name cell
/// nests the bank link after a flag icon, so the anchor text wins over
/// the raw cell text.
pub fn extract(page: &str) -> Result<Table> {
    let mut table = Table::new(EXTRACT_COLUMNS);
    let mut skipped = 0usize;

    for cells in html::first_table_body(page) {
        if cells.is_empty() {
            continue;
        }
        if cells.len() < 3 {
            skipped += 1;
            continue;
        }
        let name = cells[1]
            .link_text
            .clone()
            .unwrap_or_else(|| cells[1].text.clone());
        let mc_usd = html::clean_numeric(&cells[2].text);
        if name.is_empty() || mc_usd.is_empty() {
            skipped += 1;
            continue;
        }
        table.push(vec![Value::Str(name), Value::Str(mc_usd)])?;
    }

    if skipped > 0 {
        warn!(skipped, "dropped rows without a bank name and market cap");
    }
    Ok(table)
}

/// Parse the USD column and append one converted column per target
/// currency, rounded to two decimals.
pub fn transform(table: &mut Table, rates: &ExchangeRates) -> Result<()> {
    transform::coerce_float(table, USD_COLUMN, Coercion::Abort)?;
    for (column, code) in DERIVED {
        let rate = rates.rate(code)?;
        currency::add_converted_column(table, USD_COLUMN, column, rate)?;
    }
    Ok(())
}

/// Scrape, convert and persist the bank table end to end.
pub fn run() -> Result<()> {
    fs::create_dir_all(DATA_DIR).context("creating data directory")?;
    let log = ProgressLog::new(LOG_PATH);
    log.record("Preliminaries complete. Initiating ETL process.")?;

    log.record("Initiating data extraction.")?;
    let page = fetch::page_text(URL)?;
    let mut table = extract(&page)?;
    info!(rows = table.len(), "extracted bank rows");
    log.record("Data extraction complete. Initiating transformation process.")?;

    let rates = ExchangeRates::from_csv(Path::new(EXCHANGE_RATE_CSV))?;
    transform(&mut table, &rates)?;
    log.record("Data transformation complete. Initiating loading process.")?;

    load::write_csv(&table, Path::new(CSV_PATH))?;
    log.record("Data saved to CSV file.")?;

    let mut conn =
        Connection::open(DB_PATH).with_context(|| format!("opening {}", DB_PATH))?;
    log.record("SQL connection initiated.")?;
    load::replace_table(&mut conn, TABLE_NAME, &table)?;
    log.record("Data loaded to database as a table. Running the queries.")?;

    for sql in QUERIES {
        load::run_query(&conn, sql)?;
    }
    log.record("Process complete.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!("<html><body><table><tbody>{}</tbody></table></body></html>", rows)
    }

    fn fixed_rates() -> ExchangeRates {
        ExchangeRates::from_pairs([("GBP", 0.8), ("EUR", 0.93), ("INR", 82.95)])
    }

    #[test]
    fn extracts_anchor_names_and_market_caps() -> Result<()> {
        let page = page(
            "<tr><th>Rank</th><th>Bank name</th><th>Market cap</th></tr>\
             <tr><td>1</td><td><span class=\"flagicon\">us</span> <a href=\"#\">JPMorgan Chase</a></td><td>432.92</td></tr>\
             <tr><td>2</td><td><span class=\"flagicon\">us</span> <a href=\"#\">Bank of America</a></td><td>231.52</td></tr>\
             <tr><td>3</td><td>Plain Name</td><td>194.56[4]</td></tr>",
        );
        let table = extract(&page)?;
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0][0], Value::Str("JPMorgan Chase".into()));
        assert_eq!(table.rows()[2][0], Value::Str("Plain Name".into()));
        assert_eq!(table.rows()[2][1], Value::Str("194.56".into()));
        Ok(())
    }

    #[test]
    fn conversion_equals_rounded_product_per_row() -> Result<()> {
        let page = page(
            "<tr><td>1</td><td><a href=\"#\">JPMorgan Chase</a></td><td>432.92</td></tr>\
             <tr><td>2</td><td><a href=\"#\">Bank of America</a></td><td>231.52</td></tr>",
        );
        let mut table = extract(&page)?;
        transform(&mut table, &fixed_rates())?;

        assert_eq!(
            table.columns(),
            [
                "Name",
                "MC_USD_Billion",
                "MC_GBP_Billion",
                "MC_EUR_Billion",
                "MC_INR_Billion"
            ]
        );
        let row = &table.rows()[0];
        assert_eq!(row[1], Value::Float(432.92));
        assert_eq!(row[2], Value::Float(346.34));
        assert_eq!(row[3], Value::Float(402.62));
        assert_eq!(row[4], Value::Float(35910.71));

        for row in table.rows() {
            let usd = row[1].as_f64().expect("usd parsed");
            assert_eq!(row[2], Value::Float(transform::round2(usd * 0.8)));
            assert_eq!(row[3], Value::Float(transform::round2(usd * 0.93)));
            assert_eq!(row[4], Value::Float(transform::round2(usd * 82.95)));
        }
        Ok(())
    }

    #[test]
    fn missing_rate_code_aborts() -> Result<()> {
        let page = page("<tr><td>1</td><td><a href=\"#\">Bank</a></td><td>100.0</td></tr>");
        let mut table = extract(&page)?;
        let rates = ExchangeRates::from_pairs([("GBP", 0.8)]);
        assert!(transform(&mut table, &rates).is_err());
        Ok(())
    }

    #[test]
    fn unparseable_market_cap_aborts() -> Result<()> {
        let page = page("<tr><td>1</td><td><a href=\"#\">Bank</a></td><td>soon</td></tr>");
        let mut table = extract(&page)?;
        assert!(transform(&mut table, &fixed_rates()).is_err());
        Ok(())
    }
}
