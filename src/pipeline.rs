//! End-to-end run: discover, read in parallel, combine, save.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use log::info;

use crate::{
    cli::RunArgs,
    combine,
    dispatch::{self, Dispatch},
    ingest::IngestOptions,
    io_utils,
    report::{ColumnReport, PhaseTimings, RunReport, format_timings},
    sink,
    timing::{self, Stopwatch},
};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub database: PathBuf,
    pub table: String,
    pub ingest: IngestOptions,
    pub threads: Option<usize>,
    pub report: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn from_args(args: &RunArgs) -> Result<Self> {
        ensure!(args.chunk_size > 0, "--chunk-size must be greater than zero");
        ensure!(
            args.threads != Some(0),
            "--threads must be greater than zero"
        );
        ensure!(!args.table.trim().is_empty(), "--table cannot be empty");
        let candidates = io_utils::resolve_candidates(&args.encodings)?;
        Ok(Self {
            input_dir: args.input_dir.clone(),
            database: args.database.clone(),
            table: args.table.clone(),
            ingest: IngestOptions {
                candidates,
                chunk_size: args.chunk_size,
                delimiter: args.delimiter,
            },
            threads: args.threads,
            report: args.report.clone(),
        })
    }

    /// Default settings rooted at the given input directory and database.
    pub fn new(input_dir: impl Into<PathBuf>, database: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            database: database.into(),
            table: "combined_table".to_string(),
            ingest: IngestOptions::default(),
            threads: None,
            report: None,
        }
    }
}

pub fn execute(args: &RunArgs) -> Result<()> {
    let config = PipelineConfig::from_args(args)?;
    run(&config).map(|_| ())
}

pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    let stopwatch = Stopwatch::start("main");
    ensure!(
        config.input_dir.is_dir(),
        "Input directory {:?} does not exist",
        config.input_dir
    );
    let labels = config
        .ingest
        .candidates
        .iter()
        .map(|c| c.label.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    info!(
        "Combining CSV files from {:?} (delimiter '{}', encodings: {labels})",
        config.input_dir,
        io_utils::printable_delimiter(config.ingest.delimiter)
    );

    let files = io_utils::list_csv_files(&config.input_dir)?;
    info!("Found {} CSV file(s)", files.len());
    let pool = dispatch::build_pool(config.threads)?;

    let (dispatched, read_elapsed) =
        timing::timed(|| dispatch::dispatch(&files, &config.ingest, &pool));
    let rows_read = dispatched.reported_rows();
    let Dispatch { tables, skipped } = dispatched;
    let files_combined = tables.len();

    let (combined, concat_elapsed) =
        timing::timed(|| combine::concat(tables.into_iter().map(|file| file.table)));
    let combined = combined
        .with_context(|| format!("Combining tables from {:?}", config.input_dir))?;

    println!("Saving the combined data to SQLite database...");
    let (written, save_elapsed) =
        timing::timed(|| sink::write_table(&config.database, &config.table, &combined));
    let written = written?;

    let report = RunReport {
        input_dir: config.input_dir.clone(),
        database: config.database.clone(),
        table: written.table,
        files_discovered: files.len(),
        files_combined,
        skipped,
        rows_read,
        rows_written: written.rows,
        columns: written
            .columns
            .into_iter()
            .map(|(name, column_type)| ColumnReport {
                name,
                column_type,
                sql_type: column_type.sql_type(),
            })
            .collect(),
        timings: PhaseTimings {
            read_seconds: read_elapsed.as_secs_f64(),
            concat_seconds: concat_elapsed.as_secs_f64(),
            save_seconds: save_elapsed.as_secs_f64(),
        },
    };

    report.print();
    timing::print_phase("read and process CSV files", read_elapsed);
    timing::print_phase("concatenate tables", concat_elapsed);
    timing::print_phase("save the combined table", save_elapsed);
    info!("Phase timings: {}", format_timings(&report.timings));

    if let Some(path) = &config.report {
        report.save(path)?;
        info!("Run report written to {:?}", path);
    }
    stopwatch.finish();
    Ok(report)
}
