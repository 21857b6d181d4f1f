//! sv_pipeline: deterministic validation surface
//! (ground truth → encoding → blank lines → header → rows → completeness).
//! I/O goes through `sv_io`, field rules and scoring come from `sv_algo`.
//!
//! Format violations are values (`ValidationOutcome` / a violation list);
//! `Err(PipelineError)` is reserved for conditions that prevent validation
//! from running at all (missing files, unreadable ground truth).

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use sv_core::schema::SubmissionSchema;
use sv_core::sequence::CanonicalIdSequence;
use sv_core::violation::{ValidationError, ValidationOutcome};
use sv_io::IoError;
use thiserror::Error;
use tracing::{debug, info};

pub mod cursor;
pub mod engine;
#[cfg(feature = "scoring")]
pub mod score;

pub use cursor::ValidationCursor;
pub use engine::Violations;
#[cfg(feature = "scoring")]
pub use score::{run_scoring, ScoreRequest, ScoreRun};
#[cfg(feature = "scoring")]
pub use sv_algo::concept_f1::ConceptScores;

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("invalid request: {0}")]
    Request(String),
}

/// Stop at the first violation, or report all of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    FailFast,
    Collect,
}

/// One validation run, fully resolved.
#[derive(Clone, Debug)]
pub struct ValidationRequest {
    pub schema: SubmissionSchema,
    pub submission: PathBuf,
    /// Ground-truth files in priority order.
    pub ground_truth: Vec<PathBuf>,
    pub mode: Mode,
}

/// SHA-256 of one input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputDigest {
    pub path: PathBuf,
    pub sha256: String,
}

/// Everything a report needs about one run.
#[derive(Clone, Debug)]
pub struct ValidationRun {
    pub schema: SubmissionSchema,
    pub submission: InputDigest,
    pub ground_truth: Vec<InputDigest>,
    pub canonical_len: usize,
    pub rows_scanned: usize,
    /// In fail-fast mode at most one entry.
    pub violations: Vec<ValidationError>,
}

impl ValidationRun {
    pub fn outcome(&self) -> ValidationOutcome {
        self.violations.first().cloned().into()
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check `bytes` against `canonical`. Returns the violations and the number of data rows scanned.
pub fn validate_bytes(
    schema: SubmissionSchema,
    bytes: &[u8],
    canonical: &CanonicalIdSequence,
    mode: Mode,
) -> (Vec<ValidationError>, usize) {
    let mut it = Violations::new(schema, bytes, canonical);
    let violations: Vec<ValidationError> = match mode {
        Mode::FailFast => it.next().into_iter().collect(),
        Mode::Collect => it.by_ref().collect(),
    };
    (violations, it.rows_scanned())
}

/// Fail-fast check of in-memory bytes.
pub fn validate_submission(
    schema: SubmissionSchema,
    bytes: &[u8],
    canonical: &CanonicalIdSequence,
) -> ValidationOutcome {
    Violations::new(schema, bytes, canonical).first()
}

/// Load ground truth. A header violation in a ground-truth file comes back as `Ok(Err(..))`.
pub(crate) fn load_ground_truth(
    paths: &[PathBuf],
) -> Result<Result<CanonicalIdSequence, ValidationError>, PipelineError> {
    if paths.is_empty() {
        return Err(PipelineError::Request("no ground-truth files given".into()));
    }
    sv_io::layout::ensure_present(paths)?;
    match sv_io::ground_truth::load_canonical_ids(paths) {
        Ok(seq) => Ok(Ok(seq)),
        Err(IoError::GroundTruth(e)) => Ok(Err(e)),
        Err(e) => Err(e.into()),
    }
}

fn digest_files(paths: &[PathBuf]) -> Result<Vec<InputDigest>, PipelineError> {
    paths
        .iter()
        .map(|p| -> Result<InputDigest, PipelineError> {
            Ok(InputDigest { path: p.clone(), sha256: sv_io::hasher::sha256_file(p)? })
        })
        .collect()
}

/// Full run: load ground truth, read the submission, validate, fingerprint inputs.
pub fn run_validation(req: &ValidationRequest) -> Result<ValidationRun, PipelineError> {
    let canonical = load_ground_truth(&req.ground_truth)?;
    let bytes = sv_io::read_bytes(&req.submission)?;
    let submission = InputDigest { path: req.submission.clone(), sha256: sv_io::hasher::sha256_hex(&bytes) };
    let ground_truth = digest_files(&req.ground_truth)?;

    let (canonical_len, rows_scanned, violations) = match canonical {
        Ok(seq) => {
            debug!(ids = seq.len(), files = req.ground_truth.len(), "ground truth ready");
            let (violations, rows) = validate_bytes(req.schema, &bytes, &seq, req.mode);
            (seq.len(), rows, violations)
        }
        Err(e) => (0, 0, vec![e]),
    };

    info!(
        schema = %req.schema,
        submission = %req.submission.display(),
        rows = rows_scanned,
        violations = violations.len(),
        "validation finished"
    );

    Ok(ValidationRun { schema: req.schema, submission, ground_truth, canonical_len, rows_scanned, violations })
}

/// Convenience for callers holding a single path.
pub fn validate_file(
    schema: SubmissionSchema,
    submission: &Path,
    ground_truth: &[PathBuf],
) -> Result<ValidationOutcome, PipelineError> {
    let req = ValidationRequest {
        schema,
        submission: submission.to_path_buf(),
        ground_truth: ground_truth.to_vec(),
        mode: Mode::FailFast,
    };
    Ok(run_validation(&req)?.outcome())
}
