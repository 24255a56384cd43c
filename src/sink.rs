//! SQLite persistence of the combined table.
//!
//! The destination table is dropped and recreated inside one transaction, so
//! a failed run leaves the previous contents in place. `VACUUM` runs after
//! the commit to return freed pages to the filesystem.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{Connection, params_from_iter};

use crate::{
    data::parse_typed_value,
    schema::{ColumnType, infer_column_types},
    table::Table,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub table: String,
    pub rows: usize,
    pub columns: Vec<(String, ColumnType)>,
}

pub fn write_table(db_path: &Path, table_name: &str, table: &Table) -> Result<WriteSummary> {
    let types = infer_column_types(table);
    let mut conn = Connection::open(db_path)
        .with_context(|| format!("Opening SQLite database {db_path:?}"))?;
    let rows = replace_table(&mut conn, table_name, table, &types)
        .with_context(|| format!("Writing table '{table_name}' to {db_path:?}"))?;
    conn.execute_batch("VACUUM")
        .with_context(|| format!("Compacting SQLite database {db_path:?}"))?;
    conn.close()
        .map_err(|(_, err)| err)
        .with_context(|| format!("Closing SQLite database {db_path:?}"))?;
    info!("Wrote {rows} row(s) to '{table_name}' in {db_path:?}");

    Ok(WriteSummary {
        table: table_name.to_string(),
        rows,
        columns: table.columns().iter().cloned().zip(types).collect(),
    })
}

fn replace_table(
    conn: &mut Connection,
    table_name: &str,
    table: &Table,
    types: &[ColumnType],
) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {}",
        quote_identifier(table_name)
    ))?;
    let create = create_table_sql(table_name, table.columns(), types);
    debug!("{create}");
    tx.execute_batch(&create)?;

    let mut written = 0usize;
    {
        let mut insert = tx.prepare(&insert_sql(table_name, table.column_count()))?;
        for row in table.rows() {
            let values = row
                .iter()
                .zip(types)
                .map(|(cell, ty)| cell.as_deref().map(|raw| parse_typed_value(raw, *ty)));
            written += insert.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;
    Ok(written)
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table_name: &str, columns: &[String], types: &[ColumnType]) -> String {
    let definitions = columns
        .iter()
        .zip(types)
        .map(|(name, ty)| format!("{} {}", quote_identifier(name), ty.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({definitions})", quote_identifier(table_name))
}

fn insert_sql(table_name: &str, column_count: usize) -> String {
    let placeholders = (1..=column_count)
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} VALUES ({placeholders})",
        quote_identifier(table_name)
    )
}
