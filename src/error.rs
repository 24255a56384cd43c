//! Error types for per-file ingestion and table combination.
//!
//! Per-file failures are values, not aborts: the dispatcher turns every
//! [`IngestError`] into a skipped-file entry and keeps going. Only
//! [`CombineError`] and store failures end the run.

use std::io;

use thiserror::Error;

/// Why a single candidate encoding could not read a file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptError {
    #[error("invalid {encoding} byte sequence on line {line}")]
    Decode { encoding: String, line: u64 },

    #[error("line {line}: expected {expected} field(s), found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("malformed record: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),

    #[error("file is empty")]
    Empty,

    #[error("header row has no labelled columns")]
    BlankHeader,

    #[error("no candidate encoding could read the file ({})", describe_attempts(.attempts))]
    Undecodable { attempts: Vec<(String, AttemptError)> },
}

fn describe_attempts(attempts: &[(String, AttemptError)]) -> String {
    attempts
        .iter()
        .map(|(label, err)| format!("{label}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombineError {
    #[error("no CSV file produced a table; nothing to combine")]
    NoTables,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undecodable_lists_every_attempt() {
        let err = IngestError::Undecodable {
            attempts: vec![
                (
                    "utf-8".to_string(),
                    AttemptError::Decode {
                        encoding: "UTF-8".to_string(),
                        line: 3,
                    },
                ),
                (
                    "latin1".to_string(),
                    AttemptError::FieldCount {
                        line: 4,
                        expected: 2,
                        found: 5,
                    },
                ),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("utf-8: invalid UTF-8 byte sequence on line 3"));
        assert!(message.contains("latin1: line 4: expected 2 field(s), found 5"));
    }
}
