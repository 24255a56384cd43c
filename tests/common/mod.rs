#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use rusqlite::Connection;
use tempfile::{TempDir, tempdir};

/// Scratch layout for one run: an input directory plus a database path,
/// both removed on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("temp dir");
        fs::create_dir(temp_dir.path().join("csv_files")).expect("create input dir");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.temp_dir.path().join("csv_files")
    }

    pub fn database(&self) -> PathBuf {
        self.temp_dir.path().join("sqlite.db")
    }

    /// Writes UTF-8 `contents` into the input directory.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Writes `contents` encoded as windows-1252 into the input directory.
    pub fn write_cp1252(&self, name: &str, contents: &str) -> PathBuf {
        let (encoded, _, had_errors) = WINDOWS_1252.encode(contents);
        assert!(!had_errors, "fixture must be representable in cp1252");
        self.write_bytes(name, &encoded)
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.input_dir().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }
}

pub fn row_count(db: &Path, table: &str) -> i64 {
    let conn = Connection::open(db).expect("open db");
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
        row.get(0)
    })
    .expect("count rows")
}

pub fn column_names(db: &Path, table: &str) -> Vec<String> {
    let conn = Connection::open(db).expect("open db");
    let mut stmt = conn
        .prepare(&format!("SELECT name FROM pragma_table_info('{table}') ORDER BY cid"))
        .expect("prepare table_info");
    stmt.query_map([], |row| row.get::<_, String>(0))
        .expect("query table_info")
        .collect::<Result<Vec<_>, _>>()
        .expect("collect column names")
}

pub fn table_exists(db: &Path, table: &str) -> bool {
    let conn = Connection::open(db).expect("open db");
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .expect("query sqlite_master")
        > 0
}
