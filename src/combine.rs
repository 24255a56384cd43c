//! Row-wise concatenation of per-file tables.
//!
//! Columns are unioned by name in order of first appearance. A table that
//! lacks a column contributes missing values for it.

use std::collections::HashMap;

use log::debug;

use crate::{error::CombineError, table::Table};

pub fn concat<I>(tables: I) -> Result<Table, CombineError>
where
    I: IntoIterator<Item = Table>,
{
    let tables: Vec<Table> = tables.into_iter().collect();
    if tables.is_empty() {
        return Err(CombineError::NoTables);
    }

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for table in &tables {
        for name in table.columns() {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let total_rows = tables.iter().map(Table::row_count).sum();
    let mut rows = Vec::with_capacity(total_rows);
    for table in tables {
        if table.columns() == columns.as_slice() {
            rows.extend(table.into_parts().1);
            continue;
        }
        let targets: Vec<usize> = table
            .columns()
            .iter()
            .map(|name| positions[name.as_str()])
            .collect();
        debug!(
            "Aligning {} row(s) with {} of {} column(s)",
            table.row_count(),
            targets.len(),
            columns.len()
        );
        for row in table.into_parts().1 {
            let mut aligned = vec![None; columns.len()];
            for (cell, &target) in row.into_iter().zip(&targets) {
                aligned[target] = cell;
            }
            rows.push(aligned);
        }
    }

    Ok(Table::from_parts(columns, rows))
}
