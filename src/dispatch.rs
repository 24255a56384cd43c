//! Concurrent ingestion of every CSV file in the input directory.
//!
//! Each file becomes one task on a bounded rayon pool. Tasks report back over
//! a channel as they finish, so the collected tables follow completion order
//! rather than listing order. The pool scope is the only synchronization
//! point: collection starts after every task has returned.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::mpsc,
    thread::available_parallelism,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;

use crate::{
    error::IngestError,
    ingest::{self, FileTable, IngestOptions},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Dispatch {
    /// Successfully read files, in completion order.
    pub tables: Vec<FileTable>,
    pub skipped: Vec<SkippedFile>,
}

impl Dispatch {
    /// Sum of the per-file row counts printed while reading.
    pub fn reported_rows(&self) -> usize {
        self.tables.iter().map(FileTable::row_count).sum()
    }

    fn record(&mut self, path: PathBuf, outcome: Result<FileTable, IngestError>) {
        match outcome {
            Ok(table) => {
                debug!(
                    "{:?}: {} row(s) in {} chunk(s) as {}",
                    path,
                    table.row_count(),
                    table.chunks_read,
                    table.encoding
                );
                self.tables.push(table);
            }
            Err(err) => {
                warn!("Skipping {:?}: {err}", path);
                self.skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }
}

pub fn default_thread_count() -> usize {
    available_parallelism().map(NonZeroUsize::get).unwrap_or(1)
}

pub fn build_pool(threads: Option<usize>) -> Result<ThreadPool> {
    let thread_count = threads.unwrap_or_else(default_thread_count);
    ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .thread_name(|idx| format!("csv-combine-{idx}"))
        .build()
        .with_context(|| format!("Building worker pool with {thread_count} thread(s)"))
}

pub fn dispatch(files: &[PathBuf], options: &IngestOptions, pool: &ThreadPool) -> Dispatch {
    info!(
        "Reading {} file(s) on {} worker thread(s)",
        files.len(),
        pool.current_num_threads()
    );
    let (sender, receiver) = mpsc::channel::<(PathBuf, Result<FileTable, IngestError>)>();
    pool.scope(|scope| {
        for path in files {
            let sender = sender.clone();
            scope.spawn(move |_| {
                let outcome = ingest::read_file(path, options);
                // The receiver outlives the scope, so sending cannot fail.
                let _ = sender.send((path.clone(), outcome));
            });
        }
    });
    drop(sender);

    let mut dispatch = Dispatch::default();
    for (path, outcome) in receiver {
        dispatch.record(path, outcome);
    }
    dispatch
}

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
