//! render_text.rs: human-readable output for stdout.
//!
//! ```text
//! Submission format check passed.
//! ```
//! or
//! ```text
//! Submission format error detected:
//! Row 3: ID order mismatch. Expected 'im2' at position 2, found 'im3'
//! ```

use std::fmt::Write as _;

use sv_pipeline::ScoreRun;

use crate::{ReportModel, Status, ViolationRow};

pub const PASSED: &str = "Submission format check passed.";
pub const FAILED: &str = "Submission format error detected:";

/// Outcome block, plus a run summary when `verbose`.
pub fn render_text(m: &ReportModel, verbose: bool) -> String {
    let mut out = String::new();
    match m.status {
        Status::Passed => {
            out.push_str(PASSED);
            out.push('\n');
        }
        Status::Failed => {
            out.push_str(FAILED);
            out.push('\n');
            for v in &m.violations {
                out.push_str(&v.display_line());
                out.push('\n');
            }
        }
    }
    if verbose {
        let _ = writeln!(out, "schema: {}", m.schema);
        if let Some(split) = &m.split {
            let _ = writeln!(out, "split: {split}");
        }
        let _ = writeln!(out, "submission: {} (sha256 {})", m.submission.path, m.submission.sha256);
        for gt in &m.ground_truth {
            let _ = writeln!(out, "ground truth: {} (sha256 {})", gt.path, gt.sha256);
        }
        let _ = writeln!(out, "canonical ids: {}", m.canonical_ids);
        let _ = writeln!(out, "rows scanned: {}", m.rows_scanned);
        let _ = writeln!(out, "violations: {}", m.violations.len());
    }
    out
}

/// Outcome of a scoring run; scores only when the submission validated.
pub fn render_score_text(run: &ScoreRun) -> String {
    let mut out = String::new();
    match (run.outcome.error(), &run.scores) {
        (Some(e), _) => {
            out.push_str(FAILED);
            out.push('\n');
            out.push_str(&ViolationRow::from(e).display_line());
            out.push('\n');
        }
        (None, Some(s)) => {
            let _ = writeln!(out, "score: {:.4}", s.primary);
            let _ = writeln!(out, "score_secondary: {:.4}", s.secondary);
        }
        (None, None) => {
            out.push_str(PASSED);
            out.push('\n');
        }
    }
    out
}
