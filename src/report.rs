//! End-of-run console summary and optional JSON report.

use std::{
    fmt::Write as _,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    dispatch::{SkippedFile, file_label},
    schema::ColumnType,
    timing::format_seconds,
};

#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport {
    pub name: String,
    pub column_type: ColumnType,
    pub sql_type: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PhaseTimings {
    pub read_seconds: f64,
    pub concat_seconds: f64,
    pub save_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_dir: PathBuf,
    pub database: PathBuf,
    pub table: String,
    pub files_discovered: usize,
    pub files_combined: usize,
    pub skipped: Vec<SkippedFile>,
    /// Sum of the per-file row counts.
    pub rows_read: usize,
    pub rows_written: usize,
    pub columns: Vec<ColumnReport>,
    pub timings: PhaseTimings,
}

impl RunReport {
    pub fn print(&self) {
        print!("{}", self.render());
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            "Total number of csv files processed: {}",
            self.files_discovered
        );
        let _ = writeln!(
            output,
            "Files combined: {} (skipped: {})",
            self.files_combined,
            self.skipped.len()
        );
        if !self.skipped.is_empty() {
            let rows = self
                .skipped
                .iter()
                .map(|s| vec![file_label(&s.path), s.reason.clone()])
                .collect::<Vec<_>>();
            output.push_str(&render_rows(&["file", "reason"], &rows));
        }
        let _ = writeln!(
            output,
            "Total rows in the combined table: {}",
            format_count(self.rows_written)
        );
        if self.rows_read != self.rows_written {
            let _ = writeln!(
                output,
                "Warning: {} row(s) read but {} written",
                format_count(self.rows_read),
                format_count(self.rows_written)
            );
        }
        let rows = self
            .columns
            .iter()
            .map(|c| vec![c.name.clone(), c.sql_type.to_string()])
            .collect::<Vec<_>>();
        output.push_str(&render_rows(&["column", "type"], &rows));
        output
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating report file {path:?}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Writing report to {path:?}"))
    }
}

/// Formats a count with `,` thousands separators.
pub fn format_count(value: usize) -> String {
    let digits = value.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            output.push(',');
        }
        output.push(ch);
    }
    output
}

pub fn format_timings(timings: &PhaseTimings) -> String {
    let seconds = |value: f64| format_seconds(std::time::Duration::from_secs_f64(value));
    format!(
        "read {}s, concat {}s, save {}s",
        seconds(timings.read_seconds),
        seconds(timings.concat_seconds),
        seconds(timings.save_seconds)
    )
}

/// Renders rows as left-aligned columns separated by two spaces, under a
/// dashed rule.
fn render_rows(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(flatten(cell).chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        let mut text = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        text.truncate(text.trim_end().len());
        text.push('\n');
        text
    };

    let mut output = line(headers.iter().map(|h| h.to_string()).collect());
    output.push_str(&line(widths.iter().map(|w| "-".repeat((*w).max(3))).collect()));
    for row in rows {
        output.push_str(&line(row.iter().map(|cell| flatten(cell)).collect()));
    }
    output
}

fn flatten(cell: &str) -> String {
    cell.replace(['\n', '\r', '\t'], " ")
}
