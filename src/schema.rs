//! Column storage type inference for the output store.
//!
//! Each column of the combined table is scanned once. A column is stored as
//! `INTEGER` when every present value parses as a 64-bit integer, as `REAL`
//! when every present value parses as a float, as a boolean (`INTEGER` 0/1)
//! when every present value is a boolean literal, and as `TEXT` otherwise.
//! Columns with no present values are `TEXT`.

use serde::Serialize;

use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

pub fn parse_boolean(value: &str) -> Option<bool> {
    match value {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct TypeCandidate {
    non_empty: usize,
    integer_matches: usize,
    float_matches: usize,
    boolean_matches: usize,
}

impl TypeCandidate {
    fn update(&mut self, value: &str) {
        self.non_empty += 1;
        if parse_boolean(value).is_some() {
            self.boolean_matches += 1;
            return;
        }
        let trimmed = value.trim();
        if trimmed.parse::<i64>().is_ok() {
            self.integer_matches += 1;
            self.float_matches += 1;
        } else if trimmed.parse::<f64>().is_ok() {
            self.float_matches += 1;
        }
    }

    /// True once the column can only end up as text, so scanning can stop.
    fn settled(&self) -> bool {
        let unclassified = self.non_empty - self.float_matches - self.boolean_matches;
        unclassified > 0 || (self.boolean_matches > 0 && self.float_matches > 0)
    }

    fn decide(&self) -> ColumnType {
        if self.non_empty == 0 {
            ColumnType::Text
        } else if self.boolean_matches == self.non_empty {
            ColumnType::Boolean
        } else if self.integer_matches == self.non_empty {
            ColumnType::Integer
        } else if self.float_matches == self.non_empty {
            ColumnType::Float
        } else {
            ColumnType::Text
        }
    }
}

pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut candidate = TypeCandidate::default();
    for value in values.into_iter().flatten() {
        candidate.update(value);
        if candidate.settled() {
            return ColumnType::Text;
        }
    }
    candidate.decide()
}

pub fn infer_column_types(table: &Table) -> Vec<ColumnType> {
    (0..table.column_count())
        .map(|idx| infer_column_type(table.column_values(idx)))
        .collect()
}
