//! sv_report/src/lib.rs: Pure offline report model + renderers (text / JSON).
//!
//! Determinism rules:
//! - No I/O here. Callers write the rendered bytes.
//! - Stable field names; violations keep pipeline order.
//! - JSON output is canonical (sorted keys, compact).

#![deny(unsafe_code)]

use std::fmt;

use sv_core::schema::Split;
use sv_core::violation::ValidationError;
use sv_pipeline::{InputDigest, Mode, ValidationRun};

pub mod render_text;
#[cfg(feature = "render_json")]
pub mod render_json;

pub use render_text::{render_score_text, render_text};
#[cfg(feature = "render_json")]
pub use render_json::render_json;

// ===== Errors =====
#[derive(Debug)]
pub enum ReportError {
    Serialize(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Serialize(m) => write!(f, "report serialization failed: {m}"),
        }
    }
}

impl std::error::Error for ReportError {}

// ===== Model =====
#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[cfg_attr(feature = "render_json", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    pub path: String,
    pub sha256: String,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViolationRow {
    pub code: String,
    pub line: Option<usize>,
    pub message: String,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ReportModel {
    pub status: Status,
    pub schema: String,
    pub split: Option<String>,
    /// "fail_fast" | "collect"
    pub mode: String,
    pub submission: InputFile,
    pub ground_truth: Vec<InputFile>,
    pub canonical_ids: usize,
    pub rows_scanned: usize,
    pub violations: Vec<ViolationRow>,
}

impl From<&InputDigest> for InputFile {
    fn from(d: &InputDigest) -> Self {
        InputFile { path: d.path.display().to_string(), sha256: d.sha256.clone() }
    }
}

impl From<&ValidationError> for ViolationRow {
    fn from(e: &ValidationError) -> Self {
        ViolationRow { code: e.code().to_string(), line: e.line, message: e.kind.to_string() }
    }
}

impl ViolationRow {
    /// Same shape as the pipeline's error display: `Row N: message`.
    pub fn display_line(&self) -> String {
        match self.line {
            Some(line) => format!("Row {line}: {}", self.message),
            None => self.message.clone(),
        }
    }
}

fn mode_token(mode: Mode) -> &'static str {
    match mode {
        Mode::FailFast => "fail_fast",
        Mode::Collect => "collect",
    }
}

// ===== API =====

/// Build the report model from a finished run.
pub fn build_model(run: &ValidationRun, split: Option<Split>, mode: Mode) -> ReportModel {
    ReportModel {
        status: if run.is_valid() { Status::Passed } else { Status::Failed },
        schema: run.schema.to_string(),
        split: split.map(|s| s.to_string()),
        mode: mode_token(mode).to_string(),
        submission: InputFile::from(&run.submission),
        ground_truth: run.ground_truth.iter().map(InputFile::from).collect(),
        canonical_ids: run.canonical_len,
        rows_scanned: run.rows_scanned,
        violations: run.violations.iter().map(ViolationRow::from).collect(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passed_run_has_no_rows() {
        let m = build_model(&fixtures::run(vec![]), Some(Split::Valid), Mode::FailFast);
        assert_eq!(m.status, Status::Passed);
        assert_eq!(m.schema, "caption");
        assert_eq!(m.split.as_deref(), Some("valid"));
        assert_eq!(m.mode, "fail_fast");
        assert!(m.violations.is_empty());
        assert_eq!(m.ground_truth[0].path, "data/valid/captions.csv");
    }

    #[test]
    fn failed_run_keeps_code_line_message() {
        let m = build_model(&fixtures::run(vec![fixtures::order_mismatch()]), None, Mode::Collect);
        assert_eq!(m.status, Status::Failed);
        let row = &m.violations[0];
        assert_eq!(row.code, "OrderMismatchError");
        assert_eq!(row.line, Some(3));
        assert_eq!(row.display_line(), "Row 3: ID order mismatch. Expected 'im2' at position 2, found 'im3'");
    }
}
