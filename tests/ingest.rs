mod common;

use csv_combine::{
    error::IngestError,
    ingest::{IngestOptions, read_file},
    io_utils::resolve_candidates,
};
use proptest::prelude::*;

use common::TestWorkspace;

fn options_with(labels: &[&str]) -> IngestOptions {
    IngestOptions {
        candidates: resolve_candidates(labels).expect("valid labels"),
        ..IngestOptions::default()
    }
}

#[test]
fn first_successful_encoding_wins_even_if_later_ones_would_work() {
    let ws = TestWorkspace::new();
    let path = ws.write("ascii.csv", "id,name\n1,plain\n");

    let default = read_file(&path, &IngestOptions::default()).expect("read");
    assert_eq!(default.encoding, "utf-8");

    let reordered = read_file(&path, &options_with(&["cp1252", "utf-8"])).expect("read");
    assert_eq!(reordered.encoding, "cp1252");
}

#[test]
fn cp1252_file_falls_through_utf8() {
    let ws = TestWorkspace::new();
    let path = ws.write_cp1252("legacy.csv", "id,city\n1,Montr\u{e9}al\n2,K\u{f6}ln \u{2013} Nord\n");

    let table = read_file(&path, &IngestOptions::default()).expect("read");
    assert_ne!(table.encoding, "utf-8");
    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.table.rows()[1][1].as_deref(),
        Some("K\u{f6}ln \u{2013} Nord")
    );

    let strict = read_file(&path, &options_with(&["utf-8", "utf-8", "cp1252"])).expect("read");
    assert_eq!(strict.encoding, "cp1252");
}

#[test]
fn file_unreadable_in_every_candidate_is_undecodable() {
    let ws = TestWorkspace::new();
    let path = ws.write_bytes("bad.csv", b"id,name\n1,caf\xE9\n");

    let err = read_file(&path, &options_with(&["utf-8"])).unwrap_err();
    match err {
        IngestError::Undecodable { attempts } => {
            assert_eq!(attempts.len(), 1);
            assert_eq!(attempts[0].0, "utf-8");
        }
        other => panic!("expected undecodable, got {other:?}"),
    }
}

#[test]
fn rows_wider_than_the_header_fail_every_encoding() {
    let ws = TestWorkspace::new();
    let path = ws.write("wide.csv", "id,name\n1,a\n2,b,extra\n");

    let err = read_file(&path, &IngestOptions::default()).unwrap_err();
    match err {
        IngestError::Undecodable { attempts } => assert_eq!(attempts.len(), 4),
        other => panic!("expected undecodable, got {other:?}"),
    }
}

#[test]
fn trailing_delimiter_on_every_row_skips_the_file() {
    let ws = TestWorkspace::new();
    let path = ws.write("trailing_comma.csv", "id,name\n1,a,\n2,b,\n");

    let err = read_file(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::Undecodable { .. }), "got {err:?}");
}

#[test]
fn decode_failure_in_a_later_chunk_discards_earlier_chunks() {
    let ws = TestWorkspace::new();
    let path = ws.write_bytes("late.csv", b"id,name\n1,a\n2,b\n3,c\n4,d\n5,caf\xE9\n");
    let options = IngestOptions {
        chunk_size: 1,
        ..IngestOptions::default()
    };

    let table = read_file(&path, &options).expect("read");
    assert_eq!(table.encoding, "latin1");
    assert_eq!(table.row_count(), 5);
    assert_eq!(table.chunks_read, 5);
    let ids: Vec<_> = table.table.column_values(0).collect();
    assert_eq!(ids, vec![Some("1"), Some("2"), Some("3"), Some("4"), Some("5")]);
    assert_eq!(table.table.rows()[4][1].as_deref(), Some("caf\u{e9}"));
}

#[test]
fn trailing_unlabelled_columns_are_excluded() {
    let ws = TestWorkspace::new();
    let path = ws.write("trailing.csv", "id,name,,\n1,a,noise,more\n2,b,,\n");

    let table = read_file(&path, &IngestOptions::default()).expect("read");
    assert_eq!(table.table.columns(), &["id".to_string(), "name".to_string()]);
    assert!(table.table.rows().iter().all(|row| row.len() == 2));
}

#[test]
fn placeholder_columns_inside_the_boundary_are_dropped() {
    let ws = TestWorkspace::new();
    let path = ws.write("gap.csv", "id,,name\n1,x,a\n");

    let table = read_file(&path, &IngestOptions::default()).expect("read");
    assert_eq!(table.table.columns(), &["id".to_string(), "name".to_string()]);
    assert_eq!(table.table.rows()[0][1].as_deref(), Some("a"));
}

#[test]
fn blank_header_and_empty_file_are_reported() {
    let ws = TestWorkspace::new();
    let blank = ws.write("blank.csv", ",,\n1,2,3\n");
    let empty = ws.write("empty.csv", "");

    assert!(matches!(
        read_file(&blank, &IngestOptions::default()),
        Err(IngestError::BlankHeader)
    ));
    assert!(matches!(
        read_file(&empty, &IngestOptions::default()),
        Err(IngestError::Empty)
    ));
}

#[test]
fn chunk_size_does_not_change_the_result() {
    let ws = TestWorkspace::new();
    let mut contents = String::from("n,label\n");
    for idx in 0..25 {
        contents.push_str(&format!("{idx},row{idx}\n"));
    }
    let path = ws.write("many.csv", &contents);

    let whole = read_file(&path, &IngestOptions::default()).expect("read");
    let small = IngestOptions {
        chunk_size: 4,
        ..IngestOptions::default()
    };
    let chunked = read_file(&path, &small).expect("read");
    assert_eq!(chunked.chunks_read, 7);
    assert_eq!(whole.table, chunked.table);
}

proptest! {
    #[test]
    fn boundary_keeps_only_labelled_prefix(
        labelled in 1usize..6,
        trailing in 0usize..4,
        extra in 0usize..4,
    ) {
        let ws = TestWorkspace::new();
        let mut header: Vec<String> = (0..labelled).map(|i| format!("c{i}")).collect();
        header.extend(std::iter::repeat_n(String::new(), trailing));
        let width = header.len();
        let data: Vec<String> = (0..width.min(labelled + extra.min(trailing)))
            .map(|i| format!("v{i}"))
            .collect();
        let contents = format!("{}\n{}\n", header.join(","), data.join(","));
        let path = ws.write("prop.csv", &contents);

        let table = read_file(&path, &IngestOptions::default()).expect("read");
        prop_assert_eq!(table.table.column_count(), labelled);
        prop_assert_eq!(table.row_count(), 1);
        prop_assert!(table.table.rows()[0].iter().all(|cell| cell.is_some()));
    }
}
