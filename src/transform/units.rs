// src/transform/units.rs
use super::round2;
use crate::table::{Table, Value};
use anyhow::{bail, Result};

/// Meters per inch.
pub const METERS_PER_INCH: f64 = 0.0254;
/// Kilograms per pound.
pub const KILOGRAMS_PER_POUND: f64 = 0.45359237;

/// Scale a numeric column by `factor` in place, rounding the result to
/// two decimals. Nulls pass through untouched; a non-numeric value is an
/// error, since coercion is expected to have run first.
pub fn scale_column(table: &mut Table, column: &str, factor: f64) -> Result<()> {
    table.map_column(column, |v| match v.as_f64() {
        Some(x) => Ok(Value::Float(round2(x * factor))),
        None if v.is_null() => Ok(Value::Null),
        None => bail!("column {:?}: cannot scale non-numeric value {}", column, v),
    })
}
