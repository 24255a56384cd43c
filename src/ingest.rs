//! Per-file ingestion: encoding probing, header truncation and chunked reads.
//!
//! [`read_file`] tries each candidate encoding in order. An attempt streams
//! the file in batches of `chunk_size` raw records, decodes every batch
//! through the file's [`ColumnPlan`], and keeps the batches until the file is
//! exhausted. The first attempt that finishes without a decode or parse
//! error wins; no later candidate is tried.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use encoding_rs::Encoding;
use log::debug;

use crate::{
    columns::ColumnPlan,
    error::{AttemptError, IngestError},
    io_utils::{self, CandidateEncoding},
    report::format_count,
    table::{Cell, Table},
};

pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Cell values read as missing, in addition to the empty field.
const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub candidates: Vec<CandidateEncoding>,
    pub chunk_size: usize,
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            candidates: io_utils::default_candidates(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
        }
    }
}

/// The decoded, truncated contents of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTable {
    pub path: PathBuf,
    /// Label of the candidate encoding that decoded the file.
    pub encoding: String,
    pub chunks_read: usize,
    pub table: Table,
}

impl FileTable {
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }
}

enum AttemptFailure {
    Retry(AttemptError),
    Abort(IngestError),
}

impl From<AttemptError> for AttemptFailure {
    fn from(err: AttemptError) -> Self {
        AttemptFailure::Retry(err)
    }
}

impl From<IngestError> for AttemptFailure {
    fn from(err: IngestError) -> Self {
        AttemptFailure::Abort(err)
    }
}

pub fn read_file(path: &Path, options: &IngestOptions) -> Result<FileTable, IngestError> {
    let mut attempts = Vec::with_capacity(options.candidates.len());
    for candidate in &options.candidates {
        debug!("Reading {:?} as {}", path, candidate.label);
        match read_with_encoding(path, candidate.encoding, options) {
            Ok((table, chunks_read)) => {
                println!(
                    "Total rows read from {}: {}",
                    path.display(),
                    format_count(table.row_count())
                );
                return Ok(FileTable {
                    path: path.to_path_buf(),
                    encoding: candidate.label.clone(),
                    chunks_read,
                    table,
                });
            }
            Err(AttemptFailure::Retry(err)) => {
                debug!("{:?} is not readable as {}: {err}", path, candidate.label);
                attempts.push((candidate.label.clone(), err));
            }
            Err(AttemptFailure::Abort(err)) => return Err(err),
        }
    }
    Err(IngestError::Undecodable { attempts })
}

fn read_with_encoding(
    path: &Path,
    encoding: &'static Encoding,
    options: &IngestOptions,
) -> Result<(Table, usize), AttemptFailure> {
    let reader = io_utils::open_csv_reader_from_path(path, options.delimiter)
        .map_err(IngestError::Io)?;
    read_chunks(reader, encoding, options.chunk_size.max(1))
}

/// Reads an already opened CSV stream with a single encoding.
fn read_chunks<R: Read>(
    mut reader: csv::Reader<R>,
    encoding: &'static Encoding,
    chunk_size: usize,
) -> Result<(Table, usize), AttemptFailure> {
    let mut records = reader.byte_records();
    let header = match records.next() {
        Some(result) => result.map_err(classify_csv_error)?,
        None => return Err(IngestError::Empty.into()),
    };
    let labels = decode_header(&header, encoding)?;
    let plan = ColumnPlan::from_header(&labels)?;
    debug!(
        "Header has {} field(s); keeping {} column(s) up to position {}",
        plan.header_width(),
        plan.names().len(),
        plan.boundary()
    );

    let mut chunks: Vec<Table> = Vec::new();
    let mut batch: Vec<csv::ByteRecord> = Vec::with_capacity(chunk_size.min(4096));
    for result in records {
        batch.push(result.map_err(classify_csv_error)?);
        if batch.len() == chunk_size {
            chunks.push(decode_chunk(&plan, &batch, encoding)?);
            debug!("Decoded chunk {} ({} rows)", chunks.len(), batch.len());
            batch.clear();
        }
    }
    if !batch.is_empty() {
        chunks.push(decode_chunk(&plan, &batch, encoding)?);
    }

    let chunks_read = chunks.len();
    let mut table = Table::new(plan.names().to_vec());
    for chunk in chunks {
        table.extend_rows(chunk);
    }
    Ok((table, chunks_read))
}

fn decode_header(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>, AttemptError> {
    record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let field = if idx == 0 {
                io_utils::strip_utf8_bom(field, encoding)
            } else {
                field
            };
            io_utils::decode_field(field, encoding)
                .map(|text| text.into_owned())
                .ok_or_else(|| decode_error(encoding, 1))
        })
        .collect()
}

fn decode_chunk(
    plan: &ColumnPlan,
    batch: &[csv::ByteRecord],
    encoding: &'static Encoding,
) -> Result<Table, AttemptError> {
    let mut chunk = Table::new(plan.names().to_vec());
    for record in batch {
        let line = record_line(record);
        let row = plan
            .select(record, line)?
            .into_iter()
            .map(|field| decode_cell(field, encoding, line))
            .collect::<Result<Vec<Cell>, _>>()?;
        chunk.push_row(row);
    }
    Ok(chunk)
}

fn decode_cell(
    field: Option<&[u8]>,
    encoding: &'static Encoding,
    line: u64,
) -> Result<Cell, AttemptError> {
    let Some(bytes) = field.filter(|bytes| !bytes.is_empty()) else {
        return Ok(None);
    };
    let text =
        io_utils::decode_field(bytes, encoding).ok_or_else(|| decode_error(encoding, line))?;
    if MISSING_TOKENS.contains(&text.as_ref()) {
        Ok(None)
    } else {
        Ok(Some(text.into_owned()))
    }
}

fn record_line(record: &csv::ByteRecord) -> u64 {
    record.position().map(|pos| pos.line()).unwrap_or_default()
}

fn decode_error(encoding: &'static Encoding, line: u64) -> AttemptError {
    AttemptError::Decode {
        encoding: encoding.name().to_string(),
        line,
    }
}

fn classify_csv_error(err: csv::Error) -> AttemptFailure {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => AttemptFailure::Abort(IngestError::Io(io_err)),
        _ => AttemptFailure::Retry(AttemptError::Malformed(message)),
    }
}
