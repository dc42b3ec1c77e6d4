// src/table/mod.rs
use anyhow::{bail, Result};
use std::cmp::Ordering;
use std::fmt;

/// A single cell. Sources mostly hand us strings; the transform stage
/// coerces designated columns into the numeric variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Ordering used by the sort stage. Nulls first, numerics by value,
    /// strings lexicographically, mixed kinds by their rendered form.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    /// Text form used for CSV output. Null renders as an empty field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// One row, positionally aligned with the owning table's column list.
pub type Record = Vec<Value>;

/// An ordered set of records sharing one column list. Row order is
/// insertion order until an explicit sort reorders it.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => Ok(idx),
            None => bail!("table has no column {:?}", name),
        }
    }

    /// Append one record. The arity must match the column list.
    pub fn push(&mut self, row: Record) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "record has {} values but the table has {} columns",
                row.len(),
                self.columns.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append every record of `other`, which must share this column list.
    pub fn append(&mut self, other: Table) -> Result<()> {
        if other.columns != self.columns {
            bail!(
                "cannot concatenate tables with columns {:?} and {:?}",
                other.columns,
                self.columns
            );
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Add a derived column with one value per existing row.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            bail!(
                "derived column has {} values for {} rows",
                values.len(),
                self.rows.len()
            );
        }
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Rewrite one column in place. The closure's error aborts the pass.
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&Value) -> Result<Value>,
    {
        let idx = self.column_index(column)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx])?;
        }
        Ok(())
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Record) -> bool,
    {
        self.rows.retain(f);
    }

    pub fn truncate(&mut self, limit: usize) {
        self.rows.truncate(limit);
    }

    /// Stable ascending sort by one column.
    pub fn sort_ascending_by(&mut self, column: &str) -> Result<()> {
        let idx = self.column_index(column)?;
        self.rows.sort_by(|a, b| a[idx].compare(&b[idx]));
        Ok(())
    }
}
