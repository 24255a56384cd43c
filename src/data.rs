//! Typed cell values bound into SQLite statements.

use rusqlite::types::{ToSql, ToSqlOutput};

use crate::schema::{ColumnType, parse_boolean};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Float(f) => ToSqlOutput::from(*f),
            Value::Boolean(b) => ToSqlOutput::from(*b),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// Converts a raw cell to the column's storage type. A value that does not
/// fit the type is kept as text rather than lost.
pub fn parse_typed_value(raw: &str, ty: ColumnType) -> Value {
    let parsed = match ty {
        ColumnType::Integer => raw.trim().parse().ok().map(Value::Integer),
        ColumnType::Float => raw.trim().parse().ok().map(Value::Float),
        ColumnType::Boolean => parse_boolean(raw).map(Value::Boolean),
        ColumnType::Text => None,
    };
    parsed.unwrap_or_else(|| Value::Text(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_typed_value_follows_column_type() {
        assert_eq!(parse_typed_value(" 12 ", ColumnType::Integer), Value::Integer(12));
        assert_eq!(parse_typed_value("2.5", ColumnType::Float), Value::Float(2.5));
        assert_eq!(parse_typed_value("True", ColumnType::Boolean), Value::Boolean(true));
        assert_eq!(
            parse_typed_value("007", ColumnType::Text),
            Value::Text("007".to_string())
        );
    }

    #[test]
    fn mismatched_value_is_kept_as_text() {
        assert_eq!(
            parse_typed_value("n/a-ish", ColumnType::Integer),
            Value::Text("n/a-ish".to_string())
        );
    }
}
