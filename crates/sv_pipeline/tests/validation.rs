//! End-to-end validation over files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use sv_core::schema::SubmissionSchema;
use sv_core::sequence::CanonicalIdSequence;
use sv_core::violation::{ValidationOutcome, ViolationKind};
use sv_pipeline::{
    run_scoring, run_validation, validate_bytes, validate_submission, Mode, PipelineError, ScoreRequest,
    ValidationRequest,
};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, body).unwrap();
    p
}

fn caption_gt(dir: &Path) -> PathBuf {
    write(dir, "captions.csv", "ID,Caption\nim1,a\nim2,b\nim3,c\n")
}

fn request(schema: SubmissionSchema, submission: PathBuf, gt: Vec<PathBuf>, mode: Mode) -> ValidationRequest {
    ValidationRequest { schema, submission, ground_truth: gt, mode }
}

fn first_kind(outcome: &ValidationOutcome) -> Option<&ViolationKind> {
    outcome.error().map(|e| &e.kind)
}

#[test]
fn happy_path_caption() {
    let dir = TempDir::new().unwrap();
    let gt = caption_gt(dir.path());
    let sub = write(dir.path(), "run.csv", "ID,Caption\nim1,\"Chest X-ray, PA\"\nim2, plain \nim3,\"x\"\n");
    let run = run_validation(&request(SubmissionSchema::Caption, sub, vec![gt], Mode::FailFast)).unwrap();
    assert!(run.is_valid(), "{:?}", run.violations);
    assert_eq!(run.canonical_len, 3);
    assert_eq!(run.rows_scanned, 3);
    assert_eq!(run.submission.sha256.len(), 64);
    assert_eq!(run.ground_truth.len(), 1);
}

#[test]
fn swapped_rows_report_order_mismatch_at_line_three() {
    let dir = TempDir::new().unwrap();
    let gt = caption_gt(dir.path());
    let sub = write(dir.path(), "run.csv", "ID,Caption\nim1,a\nim3,c\nim2,b\n");
    let run = run_validation(&request(SubmissionSchema::Caption, sub, vec![gt], Mode::FailFast)).unwrap();
    let outcome = run.outcome();
    let err = outcome.error().unwrap();
    assert_eq!(err.line, Some(3));
    assert_eq!(
        err.kind,
        ViolationKind::OrderMismatch { expected: "im2".into(), found: "im3".into(), position: 2 }
    );
    assert_eq!(
        err.to_string(),
        "Row 3: ID order mismatch. Expected 'im2' at position 2, found 'im3'"
    );
}

#[test]
fn duplicate_is_reported_before_order() {
    let seq = CanonicalIdSequence::from_ordered(["im1", "im2"]);
    let out = validate_submission(SubmissionSchema::Caption, b"ID,Caption\nim1,a\nim1,a\n", &seq);
    assert_eq!(first_kind(&out), Some(&ViolationKind::DuplicateId { id: "im1".into() }));
    assert_eq!(out.error().unwrap().line, Some(3));
}

#[test]
fn extra_row_after_last_canonical_id() {
    let seq = CanonicalIdSequence::from_ordered(["im1"]);
    let out = validate_submission(SubmissionSchema::Caption, b"ID,Caption\nim1,a\nim9,b\n", &seq);
    assert_eq!(first_kind(&out), Some(&ViolationKind::ExtraId { id: "im9".into() }));
}

#[test]
fn truncated_submission_is_incomplete() {
    let seq = CanonicalIdSequence::from_ordered(["im1", "im2", "im3"]);
    let out = validate_submission(SubmissionSchema::Caption, b"ID,Caption\nim1,a\n", &seq);
    assert_eq!(
        first_kind(&out),
        Some(&ViolationKind::IncompleteSubmission { missing: 2, sample: vec!["im2".into(), "im3".into()] })
    );
    assert_eq!(out.error().unwrap().line, None);
}

#[test]
fn omitting_one_id_reports_it() {
    let dir = TempDir::new().unwrap();
    let gt = caption_gt(dir.path());
    let sub = write(dir.path(), "run.csv", "ID,Caption\nim1,a\nim2,b\n");
    let run = run_validation(&request(SubmissionSchema::Caption, sub, vec![gt], Mode::FailFast)).unwrap();
    let outcome = run.outcome();
    assert_eq!(
        first_kind(&outcome),
        Some(&ViolationKind::IncompleteSubmission { missing: 1, sample: vec!["im3".into()] })
    );
    assert_eq!(run.rows_scanned, 2);
}

#[test]
fn caption_quoting_law() {
    let seq = CanonicalIdSequence::from_ordered(["im1"]);
    let bad = validate_submission(SubmissionSchema::Caption, b"ID,Caption\nim1,\"a, b\" c\n", &seq);
    assert_eq!(first_kind(&bad), Some(&ViolationKind::UnquotedComma));
    let good = validate_submission(SubmissionSchema::Caption, b"ID,Caption\nim1,\"a, b c\"\n", &seq);
    assert!(good.is_valid());
    // an unquoted comma splits the row, so the shape check fires first
    let split = validate_submission(SubmissionSchema::Caption, b"ID,Caption\nim1,a, b\n", &seq);
    assert_eq!(first_kind(&split), Some(&ViolationKind::RowShape { fields: 3 }));
}

#[test]
fn cui_law() {
    let seq = CanonicalIdSequence::from_ordered(["im1"]);
    let check = |payload: &str| {
        let text = format!("ID,CUIs\nim1,{payload}\n");
        validate_submission(SubmissionSchema::Concept, text.as_bytes(), &seq)
    };
    assert!(check("C0000726;C0920367").is_valid());
    assert!(check("").is_valid());
    assert_eq!(first_kind(&check("C1;;C2")), Some(&ViolationKind::EmptyCui));
    assert_eq!(
        first_kind(&check("C1;D2")),
        Some(&ViolationKind::InvalidCuiFormat { tokens: vec!["D2".into()] })
    );
    assert_eq!(
        first_kind(&check("C1;C1")),
        Some(&ViolationKind::DuplicateCui { duplicates: vec!["C1".into()] })
    );
    assert_eq!(
        first_kind(&check("\" C1\"")),
        Some(&ViolationKind::FieldWhitespace { value: " C1".into() })
    );
}

#[test]
fn blank_line_inside_file_fails() {
    let seq = CanonicalIdSequence::from_ordered(["im1", "im2"]);
    let out = validate_submission(SubmissionSchema::Concept, b"ID,CUIs\nim1,C1\n\nim2,C2\n", &seq);
    assert_eq!(first_kind(&out), Some(&ViolationKind::BlankLine));
    assert_eq!(out.error().unwrap().line, Some(3));
}

#[test]
fn ground_truth_header_violation_is_an_outcome() {
    let dir = TempDir::new().unwrap();
    let gt = write(dir.path(), "captions.csv", "");
    let sub = write(dir.path(), "run.csv", "ID,Caption\n");
    let run = run_validation(&request(SubmissionSchema::Caption, sub, vec![gt], Mode::FailFast)).unwrap();
    assert_eq!(run.outcome().error().map(|e| e.code()), Some("MissingOrInvalidHeader"));
}

#[test]
fn missing_files_are_fatal() {
    let dir = TempDir::new().unwrap();
    let gt = caption_gt(dir.path());
    let missing_sub = dir.path().join("absent.csv");
    let err = run_validation(&request(SubmissionSchema::Caption, missing_sub, vec![gt], Mode::FailFast)).unwrap_err();
    assert!(matches!(err, PipelineError::Io(sv_io::IoError::NotFound(_))));

    let sub = write(dir.path(), "run.csv", "ID,Caption\n");
    let err = run_validation(&request(
        SubmissionSchema::Caption,
        sub,
        vec![dir.path().join("nope.csv")],
        Mode::FailFast,
    ))
    .unwrap_err();
    assert!(matches!(err, PipelineError::Io(sv_io::IoError::NotFound(_))));
}

#[test]
fn collect_mode_reports_every_violation() {
    let seq = CanonicalIdSequence::from_ordered(["im1", "im2", "im3", "im4"]);
    let text = b"ID,CUIs\nim1,C1;C1\nim1,C2\n im2,x\nim3,C3\n";
    let (all, rows) = validate_bytes(SubmissionSchema::Concept, text, &seq, Mode::Collect);
    let got: Vec<(&str, Option<usize>)> = all.iter().map(|e| (e.code(), e.line)).collect();
    assert_eq!(
        got,
        vec![
            ("DuplicateCuiError", Some(2)),
            ("DuplicateIdError", Some(3)),
            ("IdWhitespaceError", Some(4)),
            ("InvalidCuiFormatError", Some(4)),
            ("IncompleteSubmissionError", None),
        ]
    );
    assert_eq!(rows, 4);

    let (first, _) = validate_bytes(SubmissionSchema::Concept, text, &seq, Mode::FailFast);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0], all[0]);
}

#[test]
fn concept_ground_truth_merges_manual_file() {
    let dir = TempDir::new().unwrap();
    let primary = write(dir.path(), "concepts.csv", "ID,CUIs\nim1,C1\nim2,C2\n");
    let manual = write(dir.path(), "concepts_manual.csv", "ID,CUIs\nim2,C2\nim3,C3\n");
    let sub = write(dir.path(), "run.csv", "ID,CUIs\nim1,C1\nim2,C2\nim3,\n");
    let run = run_validation(&request(SubmissionSchema::Concept, sub, vec![primary, manual], Mode::Collect)).unwrap();
    assert!(run.is_valid(), "{:?}", run.violations);
    assert_eq!(run.canonical_len, 3);
}

#[test]
fn scoring_runs_only_for_valid_submissions() {
    let dir = TempDir::new().unwrap();
    let primary = write(dir.path(), "concepts.csv", "ID,CUIs\nim1,C1;C2\nim2,C0002978\n");
    let manual = write(dir.path(), "concepts_manual.csv", "ID,CUIs\nim1,C1\nim2,C0002978\n");

    let good = write(dir.path(), "good.csv", "ID,CUIs\nim1,C2;C1\nim2,C0002978\n");
    let run = run_scoring(&ScoreRequest {
        submission: good,
        primary_ground_truth: primary.clone(),
        secondary_ground_truth: manual.clone(),
    })
    .unwrap();
    let scores = run.scores.unwrap();
    assert!((scores.primary - 1.0).abs() < 1e-12);
    assert!((scores.secondary - 1.0).abs() < 1e-12);

    let bad = write(dir.path(), "bad.csv", "ID,CUIs\nim2,C1\nim1,C1\n");
    let run = run_scoring(&ScoreRequest {
        submission: bad,
        primary_ground_truth: primary,
        secondary_ground_truth: manual,
    })
    .unwrap();
    assert!(run.scores.is_none());
    assert_eq!(run.outcome.error().map(|e| e.code()), Some("OrderMismatchError"));
}

#[test]
fn repeated_ground_truth_image_is_scored_once() {
    let dir = TempDir::new().unwrap();
    let primary = write(dir.path(), "concepts.csv", "ID,CUIs\nim1,C1\nim2,C2\nim1,C1\n");
    let manual = write(dir.path(), "concepts_manual.csv", "ID,CUIs\nim1,C1\n");
    let sub = write(dir.path(), "run.csv", "ID,CUIs\nim1,C1\nim2,C9\n");
    let run = run_scoring(&ScoreRequest {
        submission: sub,
        primary_ground_truth: primary,
        secondary_ground_truth: manual,
    })
    .unwrap();
    assert!(run.outcome.is_valid(), "{:?}", run.outcome);
    // im1 = 1.0, im2 = 0.0
    assert!((run.scores.unwrap().primary - 0.5).abs() < 1e-12);
}

fn submission_for(ids: &[String]) -> String {
    let mut s = String::from("ID,Caption\n");
    for id in ids {
        s.push_str(id);
        s.push_str(",\"a, b\"\n");
    }
    s
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn canonical_order_always_validates(n in 1usize..40) {
        let ids: Vec<String> = (0..n).map(|i| format!("img_{i:03}")).collect();
        let seq = CanonicalIdSequence::from_ordered(ids.clone());
        let text = submission_for(&ids);
        let out = validate_submission(SubmissionSchema::Caption, text.as_bytes(), &seq);
        prop_assert!(out.is_valid());
        // idempotent
        prop_assert_eq!(validate_submission(SubmissionSchema::Caption, text.as_bytes(), &seq), out);
    }

    #[test]
    fn any_swap_is_an_order_mismatch(n in 2usize..40, a in 0usize..40, b in 0usize..40) {
        let (a, b) = (a % n, b % n);
        prop_assume!(a != b);
        let ids: Vec<String> = (0..n).map(|i| format!("img_{i:03}")).collect();
        let seq = CanonicalIdSequence::from_ordered(ids.clone());
        let mut shuffled = ids.clone();
        shuffled.swap(a, b);
        let out = validate_submission(SubmissionSchema::Caption, submission_for(&shuffled).as_bytes(), &seq);
        let lo = a.min(b);
        match first_kind(&out) {
            Some(ViolationKind::OrderMismatch { position, .. }) => prop_assert_eq!(*position, lo + 1),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
        prop_assert_eq!(out.error().unwrap().line, Some(lo + 2));
    }

    #[test]
    fn any_repeated_row_is_a_duplicate(n in 2usize..30, k in 0usize..30) {
        let ids: Vec<String> = (0..n).map(|i| format!("img_{i:03}")).collect();
        let seq = CanonicalIdSequence::from_ordered(ids.clone());
        let k = k % n;
        let mut rows = ids[..=k].to_vec();
        rows.push(ids[k].clone());
        let out = validate_submission(SubmissionSchema::Caption, submission_for(&rows).as_bytes(), &seq);
        prop_assert_eq!(first_kind(&out), Some(&ViolationKind::DuplicateId { id: ids[k].clone() }));
    }
}
