use std::path::PathBuf;

use clap::{Args, Parser};

use crate::{ingest::DEFAULT_CHUNK_SIZE, io_utils::DEFAULT_ENCODING_LABELS};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Combine a directory of CSV files into a single SQLite table",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Directory scanned for *.csv input files
    #[arg(short = 'd', long = "input-dir", default_value = "csv_files")]
    pub input_dir: PathBuf,
    /// SQLite database file to write
    #[arg(short = 'o', long = "database", default_value = "sqlite.db")]
    pub database: PathBuf,
    /// Destination table, replaced on every run
    #[arg(short = 't', long = "table", default_value = "combined_table")]
    pub table: String,
    /// Number of rows decoded per batch while reading a file
    #[arg(long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Candidate encodings, tried in order until one reads the file
    #[arg(
        short = 'e',
        long = "encoding",
        value_delimiter = ',',
        default_values = DEFAULT_ENCODING_LABELS
    )]
    pub encodings: Vec<String>,
    /// Worker threads used to read files (defaults to available parallelism)
    #[arg(short = 'j', long = "threads")]
    pub threads: Option<usize>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter, default_value = ",")]
    pub delimiter: u8,
    /// Write a JSON summary of the run to this path
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["csv-combine"]).unwrap();
        assert_eq!(cli.run.input_dir, PathBuf::from("csv_files"));
        assert_eq!(cli.run.database, PathBuf::from("sqlite.db"));
        assert_eq!(cli.run.table, "combined_table");
        assert_eq!(cli.run.chunk_size, 100_000);
        assert_eq!(
            cli.run.encodings,
            vec!["utf-8", "latin1", "iso-8859-1", "cp1252"]
        );
        assert_eq!(cli.run.delimiter, b',');
        assert!(cli.run.threads.is_none());
    }

    #[test]
    fn encodings_accept_comma_lists() {
        let cli = Cli::try_parse_from(["csv-combine", "-e", "utf-8,cp1252", "--delimiter", "tab"])
            .unwrap();
        assert_eq!(cli.run.encodings, vec!["utf-8", "cp1252"]);
        assert_eq!(cli.run.delimiter, b'\t');
    }

    #[test]
    fn parse_delimiter_rejects_multi_character_values() {
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
        assert_eq!(parse_delimiter(";"), Ok(b';'));
    }
}
