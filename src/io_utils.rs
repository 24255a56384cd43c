//! I/O utilities for CSV reading and candidate-encoding resolution.
//!
//! Every source file is opened through this module. It provides:
//!
//! - **Encoding candidates**: ordered labels resolved through `encoding_rs`.
//!   `latin1` and `iso-8859-1` both resolve to windows-1252, following the
//!   WHATWG encoding standard that `encoding_rs` implements.
//! - **Reader construction**: byte-record readers that tolerate ragged rows
//!   so that field-count checks happen against the truncated header.
//! - **Strict decoding**: a field decodes or fails, there is no replacement
//!   character fallback.

use std::{
    borrow::Cow,
    fs,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, ensure};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_ENCODING_LABELS: &[&str] = &["utf-8", "latin1", "iso-8859-1", "cp1252"];
pub const CSV_SUFFIX: &str = ".csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One entry of the candidate encoding list: the label as given by the user
/// and the decoder it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEncoding {
    pub label: String,
    pub encoding: &'static Encoding,
}

impl CandidateEncoding {
    pub fn resolve(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let encoding = Encoding::for_label(trimmed.as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{label}'"))?;
        Ok(Self {
            label: trimmed.to_string(),
            encoding,
        })
    }
}

/// Resolves labels in priority order. Duplicates are kept: the list is tried
/// exactly as given.
pub fn resolve_candidates<S: AsRef<str>>(labels: &[S]) -> Result<Vec<CandidateEncoding>> {
    ensure!(!labels.is_empty(), "At least one encoding must be provided");
    labels
        .iter()
        .map(|label| CandidateEncoding::resolve(label.as_ref()))
        .collect()
}

/// The built-in candidate list, resolved from [`DEFAULT_ENCODING_LABELS`].
pub fn default_candidates() -> Vec<CandidateEncoding> {
    DEFAULT_ENCODING_LABELS
        .iter()
        .filter_map(|label| CandidateEncoding::resolve(label).ok())
        .collect()
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> std::io::Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(open_csv_reader(BufReader::new(file), delimiter))
}

/// Decodes one field, returning `None` when the bytes are not valid in
/// `encoding`.
pub fn decode_field<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors { None } else { Some(text) }
}

/// Strips a leading UTF-8 byte-order mark from the first header field.
pub fn strip_utf8_bom<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    if encoding == UTF_8 {
        bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
    } else {
        bytes
    }
}

/// Lists regular files directly under `dir` whose name ends in `.csv`,
/// sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Listing input directory {dir:?}"))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Reading entry in {dir:?}"))?;
        let path = entry.path();
        let is_csv = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(CSV_SUFFIX));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
