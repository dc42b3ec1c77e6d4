// src/transform/currency.rs
use super::round2;
use crate::table::{Table, Value};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One row of the reference file.
#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Exchange-rate reference, loaded once per run from a side CSV with
/// columns `Currency, Rate`.
#[derive(Debug, Clone, Default)]
pub struct ExchangeRates {
    rates: HashMap<String, f64>,
}

impl ExchangeRates {
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("opening exchange rate file {}", path.display()))?;

        let mut rates = HashMap::new();
        for row in rdr.deserialize() {
            let row: RateRow = row
                .with_context(|| format!("reading exchange rate row in {}", path.display()))?;
            rates.insert(row.currency, row.rate);
        }
        Ok(ExchangeRates { rates })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        ExchangeRates {
            rates: pairs.into_iter().map(|(c, r)| (c.into(), r)).collect(),
        }
    }

    /// The multiplier for `code`. A missing code aborts the run.
    pub fn rate(&self, code: &str) -> Result<f64> {
        self.rates
            .get(code)
            .copied()
            .with_context(|| format!("no exchange rate for {}", code))
    }
}

/// Append `new_column` holding `round(src × rate, 2)` for every row.
/// Nulls propagate as nulls.
pub fn add_converted_column(
    table: &mut Table,
    src: &str,
    new_column: &str,
    rate: f64,
) -> Result<()> {
    let idx = table.column_index(src)?;
    let values: Vec<Value> = table
        .rows()
        .iter()
        .map(|row| match row[idx].as_f64() {
            Some(v) => Value::Float(round2(v * rate)),
            None => Value::Null,
        })
        .collect();
    table.add_column(new_column, values)
}
