//! sv_io integration: raw bytes on disk -> decoded text -> blank scan -> records.

use std::fs;

use sv_io::prelude::*;
use sv_io::canonical_json::{to_canonical_bytes, write_bytes_atomic};
use sv_io::hasher::sha256_file;

const SUBMISSION: &str = "ID,Caption\r\n\
im1,\"Chest X-ray, PA view\"\r\n\
im2,\"Two paragraphs:\r\n\r\nsecond one\"\r\n\
im3,Axial CT\r\n";

#[test]
fn submission_file_streams_with_quoting_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.csv");
    fs::write(&path, SUBMISSION).unwrap();

    let bytes = read_bytes(&path).unwrap();
    let text = decode_strict(&bytes).unwrap();
    assert_eq!(BlankLines::new(text).count(), 0);

    let recs: Vec<Record<'_>> = Records::new(text).collect::<Result<_, _>>().unwrap();
    let lines: Vec<usize> = recs.iter().map(|r| r.line).collect();
    assert_eq!(lines, vec![1, 2, 3, 6]);
    assert_eq!(recs[1].fields[1].quoting, Quoting::Quoted);
    assert_eq!(recs[2].fields[1].text, "Two paragraphs:\r\n\r\nsecond one");
    assert_eq!(recs[3].fields[1].quoting, Quoting::Unquoted);
}

#[test]
fn missing_submission_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(read_bytes(&dir.path().join("absent.csv")), Err(IoError::NotFound(_))));
}

#[test]
fn default_layout_feeds_ground_truth_loader() {
    let dir = tempfile::tempdir().unwrap();
    let split_dir = dir.path().join("valid");
    fs::create_dir_all(&split_dir).unwrap();
    fs::write(split_dir.join("concepts.csv"), "ID,CUIs\nim1,C1\nim2,C2\n").unwrap();
    fs::write(split_dir.join("concepts_manual.csv"), "ID,CUIs\nim3,C3\nim1,C1\n").unwrap();

    let paths = default_ground_truth(
        sv_core::schema::SubmissionSchema::Concept,
        sv_core::schema::Split::Valid,
        dir.path(),
    );
    sv_io::layout::ensure_present(&paths).unwrap();
    let seq = load_canonical_ids(&paths).unwrap();
    let ids: Vec<&str> = seq.iter().map(|i| i.as_str()).collect();
    assert_eq!(ids, ["im1", "im2", "im3"]);
}

#[test]
fn canonical_report_is_stable_across_writes() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    let v = serde_json::json!({"status": "passed", "violations": [], "canonical_ids": 3});
    write_bytes_atomic(&to_canonical_bytes(&v).unwrap(), &a).unwrap();
    write_bytes_atomic(&to_canonical_bytes(&v).unwrap(), &b).unwrap();
    assert_eq!(sha256_file(&a).unwrap(), sha256_file(&b).unwrap());
    assert_eq!(fs::read_to_string(&a).unwrap(), r#"{"canonical_ids":3,"status":"passed","violations":[]}"#);
}
