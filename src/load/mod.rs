// src/load/mod.rs
//! CSV and SQLite persistence for finished tables.

use crate::table::{Table, Value};
use anyhow::{Context, Result};
use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::Path;
use tracing::info;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Null => Ok(ToSqlOutput::from(Null)),
            Value::Int(i) => Ok(ToSqlOutput::from(*i)),
            Value::Float(x) => Ok(ToSqlOutput::from(*x)),
            Value::Str(s) => Ok(ToSqlOutput::from(s.as_str())),
        }
    }
}

/// Write `table` to `path` as CSV, replacing any existing file. Floats
/// keep their shortest round-trip form; nulls become empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    wtr.write_record(table.columns())
        .context("writing CSV header")?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(Value::to_string))
            .context("writing CSV row")?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQLite column affinity inferred from the values actually present.
fn column_affinity(table: &Table, idx: usize) -> &'static str {
    let mut saw_int = false;
    let mut saw_float = false;
    for row in table.rows() {
        match &row[idx] {
            Value::Int(_) => saw_int = true,
            Value::Float(_) => saw_float = true,
            Value::Null => {}
            Value::Str(_) => return "TEXT",
        }
    }
    if saw_float {
        "REAL"
    } else if saw_int {
        "INTEGER"
    } else {
        "TEXT"
    }
}

/// Replace `name` in the database with the contents of `table`:
/// drop-and-recreate plus row-by-row inserts, all in one transaction.
pub fn replace_table(conn: &mut Connection, name: &str, table: &Table) -> Result<()> {
    let columns_sql: Vec<String> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} {}", quote_ident(col), column_affinity(table, i)))
        .collect();
    let create = format!("CREATE TABLE {} ({})", quote_ident(name), columns_sql.join(", "));
    let placeholders = vec!["?"; table.columns().len()].join(", ");
    let insert = format!("INSERT INTO {} VALUES ({})", quote_ident(name), placeholders);

    let tx = conn.transaction().context("opening transaction")?;
    tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)), [])
        .with_context(|| format!("dropping previous table {}", name))?;
    tx.execute(&create, [])
        .with_context(|| format!("creating table {}", name))?;
    {
        let mut stmt = tx.prepare(&insert).context("preparing insert")?;
        for row in table.rows() {
            stmt.execute(params_from_iter(row.iter()))
                .with_context(|| format!("inserting into {}", name))?;
        }
    }
    tx.commit().context("committing load")?;

    info!(table = name, rows = table.len(), "table replaced");
    Ok(())
}

/// Execute one fixed read-only query, printing the statement, the column
/// names and every result row to stdout.
pub fn run_query(conn: &Connection, sql: &str) -> Result<()> {
    println!("{}", sql);

    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("preparing {:?}", sql))?;
    let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let width = stmt.column_count();
    println!("{}", names.join(" | "));

    let mut rows = stmt.query([]).with_context(|| format!("running {:?}", sql))?;
    while let Some(row) = rows.next().context("reading query row")? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            let v: rusqlite::types::Value = row.get(i)?;
            cells.push(match v {
                rusqlite::types::Value::Null => String::new(),
                rusqlite::types::Value::Integer(i) => i.to_string(),
                rusqlite::types::Value::Real(x) => x.to_string(),
                rusqlite::types::Value::Text(s) => s,
                rusqlite::types::Value::Blob(b) => format!("<{} bytes>", b.len()),
            });
        }
        println!("{}", cells.join(" | "));
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{self, Dataset};
    use tempfile::tempdir;

    fn films_like() -> Result<Table> {
        let mut t = Table::new(["Film", "Year", "Rank"]);
        t.push(vec![
            Value::Str("Parasite".into()),
            Value::Int(2019),
            Value::Int(1),
        ])?;
        t.push(vec![Value::Str("Us".into()), Value::Int(2019), Value::Int(2)])?;
        t.push(vec![Value::Null, Value::Int(2020), Value::Int(3)])?;
        Ok(t)
    }

    #[test]
    fn csv_round_trip_preserves_shape() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("films.csv");
        let table = films_like()?;
        write_csv(&table, &path)?;

        let dataset = Dataset {
            columns: &["Film", "Year", "Rank"],
            xml_record: "row",
        };
        let back = extract::from_csv(&dataset, &path)?;
        assert_eq!(back.columns(), table.columns());
        assert_eq!(back.len(), table.len());
        Ok(())
    }

    #[test]
    fn replace_table_is_drop_and_recreate() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        let table = films_like()?;
        replace_table(&mut conn, "films", &table)?;
        replace_table(&mut conn, "films", &table)?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM films", [], |r| r.get(0))?;
        assert_eq!(count, table.len() as i64);

        let year: i64 =
            conn.query_row("SELECT Year FROM films WHERE Film = 'Parasite'", [], |r| {
                r.get(0)
            })?;
        assert_eq!(year, 2019);
        Ok(())
    }

    #[test]
    fn nulls_survive_the_load() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;
        replace_table(&mut conn, "films", &films_like()?)?;
        let nulls: i64 =
            conn.query_row("SELECT COUNT(*) FROM films WHERE Film IS NULL", [], |r| {
                r.get(0)
            })?;
        assert_eq!(nulls, 1);
        Ok(())
    }

    #[test]
    fn run_query_handles_every_value_kind() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("CREATE TABLE t (a INTEGER, b REAL, c TEXT); INSERT INTO t VALUES (1, 2.5, 'x'), (NULL, NULL, NULL);")?;
        run_query(&conn, "SELECT * FROM t")?;
        Ok(())
    }
}
