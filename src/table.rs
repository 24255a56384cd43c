//! In-memory tabular data shared by ingestion, combination and persistence.

/// A single cell. `None` marks a missing value.
pub type Cell = Option<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Appends the rows of a table that has exactly the same columns.
    pub fn extend_rows(&mut self, other: Table) {
        debug_assert_eq!(self.columns, other.columns);
        self.rows.extend(other.rows);
    }

    /// Iterates the cells of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| row[idx].as_deref())
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Cell>>) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_rows_keeps_order() {
        let columns = vec!["id".to_string()];
        let mut first = Table::from_parts(columns.clone(), vec![vec![Some("1".to_string())]]);
        let second = Table::from_parts(
            columns,
            vec![vec![Some("2".to_string())], vec![None]],
        );
        first.extend_rows(second);
        let values: Vec<_> = first.column_values(0).collect();
        assert_eq!(values, vec![Some("1"), Some("2"), None]);
        assert_eq!(first.row_count(), 3);
    }
}
