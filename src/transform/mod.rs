// src/transform/mod.rs
//! Per-column coercion, conversion and ordering applied between
//! extraction and load.

pub mod currency;
pub mod units;

use crate::table::{Table, Value};
use anyhow::{bail, Result};

/// What to do with a value that refuses to parse as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Propagate an error and abort the run.
    Abort,
    /// Replace the offending value with a null marker.
    Null,
}

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Parse a column into floats in place. Values that are already numeric
/// pass through; nulls stay null.
pub fn coerce_float(table: &mut Table, column: &str, on_error: Coercion) -> Result<()> {
    table.map_column(column, |v| match v {
        Value::Float(_) | Value::Null => Ok(v.clone()),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Str(s) => match s.trim().parse::<f64>() {
            Ok(x) => Ok(Value::Float(x)),
            Err(_) if on_error == Coercion::Null => Ok(Value::Null),
            Err(_) => bail!("column {:?}: cannot parse {:?} as a number", column, s),
        },
    })
}

/// Parse a column into integers in place, with the same policy handling.
pub fn coerce_int(table: &mut Table, column: &str, on_error: Coercion) -> Result<()> {
    table.map_column(column, |v| match v {
        Value::Int(_) | Value::Null => Ok(v.clone()),
        Value::Float(x) if x.fract() == 0.0 => Ok(Value::Int(*x as i64)),
        other => {
            let text = other.to_string();
            match text.trim().parse::<i64>() {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) if on_error == Coercion::Null => Ok(Value::Null),
                Err(_) => bail!("column {:?}: cannot parse {:?} as an integer", column, text),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_column(values: Vec<Value>) -> Table {
        let mut t = Table::new(["v"]);
        for v in values {
            t.push(vec![v]).expect("single column row");
        }
        t
    }

    #[test]
    fn float_coercion_parses_strings() -> Result<()> {
        let mut t = one_column(vec![
            Value::Str("432.92".into()),
            Value::Int(7),
            Value::Null,
        ]);
        coerce_float(&mut t, "v", Coercion::Abort)?;
        assert_eq!(t.rows()[0][0], Value::Float(432.92));
        assert_eq!(t.rows()[1][0], Value::Float(7.0));
        assert_eq!(t.rows()[2][0], Value::Null);
        Ok(())
    }

    #[test]
    fn abort_policy_propagates_parse_failures() {
        let mut t = one_column(vec![Value::Str("n/a".into())]);
        let err = coerce_float(&mut t, "v", Coercion::Abort).unwrap_err();
        assert!(err.to_string().contains("n/a"));
    }

    #[test]
    fn null_policy_swallows_parse_failures() -> Result<()> {
        let mut t = one_column(vec![Value::Str("n/a".into()), Value::Str("2.5".into())]);
        coerce_float(&mut t, "v", Coercion::Null)?;
        assert_eq!(t.rows()[0][0], Value::Null);
        assert_eq!(t.rows()[1][0], Value::Float(2.5));
        Ok(())
    }

    #[test]
    fn int_coercion_accepts_whole_floats() -> Result<()> {
        let mut t = one_column(vec![
            Value::Str("2014".into()),
            Value::Float(2013.0),
            Value::Str("unknown".into()),
        ]);
        coerce_int(&mut t, "v", Coercion::Null)?;
        assert_eq!(t.rows()[0][0], Value::Int(2014));
        assert_eq!(t.rows()[1][0], Value::Int(2013));
        assert_eq!(t.rows()[2][0], Value::Null);
        Ok(())
    }

    #[test]
    fn rounding_is_two_decimals() {
        assert_eq!(round2(68.0388555), 68.04);
        assert_eq!(round2(1.651), 1.65);
        assert_eq!(round2(402.6156), 402.62);
    }
}
