//! Header-driven column truncation.
//!
//! A [`ColumnPlan`] is built once per file from its decoded header row. It
//! fixes the truncation boundary (the rightmost non-blank header label),
//! assigns positional placeholder names to blank labels inside the boundary,
//! and records which source positions survive into the per-file table.

use std::collections::HashSet;

use crate::error::{AttemptError, IngestError};

/// Prefix given to columns whose header cell was blank. Any kept column whose
/// label starts with it is dropped.
pub const PLACEHOLDER_PREFIX: &str = "Unnamed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    header_width: usize,
    boundary: usize,
    keep: Vec<usize>,
    names: Vec<String>,
}

impl ColumnPlan {
    pub fn from_header(labels: &[String]) -> Result<Self, IngestError> {
        let boundary = labels
            .iter()
            .rposition(|label| !is_blank(label))
            .ok_or(IngestError::BlankHeader)?;

        let named = labels[..=boundary]
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                if is_blank(label) {
                    placeholder_name(idx)
                } else {
                    label.clone()
                }
            })
            .collect::<Vec<_>>();

        let mut keep = Vec::with_capacity(named.len());
        let mut names = Vec::with_capacity(named.len());
        for (idx, name) in dedupe_labels(named).into_iter().enumerate() {
            if is_placeholder(&name) {
                continue;
            }
            keep.push(idx);
            names.push(name);
        }
        if names.is_empty() {
            return Err(IngestError::BlankHeader);
        }

        Ok(Self {
            header_width: labels.len(),
            boundary,
            keep,
            names,
        })
    }

    /// Index of the rightmost labelled header column.
    pub fn boundary(&self) -> usize {
        self.boundary
    }

    pub fn header_width(&self) -> usize {
        self.header_width
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[cfg(test)]
    pub fn kept_positions(&self) -> &[usize] {
        &self.keep
    }

    /// Selects the kept fields of one data record. Records wider than the
    /// header are rejected; shorter ones yield `None` for the missing tail.
    pub fn select<'r>(
        &self,
        record: &'r csv::ByteRecord,
        line: u64,
    ) -> Result<Vec<Option<&'r [u8]>>, AttemptError> {
        if record.len() > self.header_width {
            return Err(AttemptError::FieldCount {
                line,
                expected: self.header_width,
                found: record.len(),
            });
        }
        Ok(self.keep.iter().map(|&idx| record.get(idx)).collect())
    }
}

pub fn placeholder_name(position: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}: {position}")
}

pub fn is_placeholder(label: &str) -> bool {
    label.starts_with(PLACEHOLDER_PREFIX)
}

fn is_blank(label: &str) -> bool {
    label.trim().is_empty()
}

/// Renames repeated labels to `name.1`, `name.2`, ... skipping any suffix
/// that is already taken by another label.
fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = labels.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut output = Vec::with_capacity(labels.len());
    for label in labels {
        if seen.insert(label.clone()) {
            output.push(label);
            continue;
        }
        let mut suffix = 1usize;
        let renamed = loop {
            let candidate = format!("{label}.{suffix}");
            if !taken.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        taken.insert(renamed.clone());
        seen.insert(renamed.clone());
        output.push(renamed);
    }
    output
}
