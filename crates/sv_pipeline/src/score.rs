//! crates/sv_pipeline/src/score.rs
//! Concept scoring: validate first (fail-fast), then score.
//! The canonical ID sequence for validation is built from both ground-truth
//! files, primary first.

use std::collections::HashMap;
use std::path::PathBuf;

use sv_algo::concept_f1::{score_concepts, ConceptScores};
use sv_core::schema::SubmissionSchema;
use sv_core::violation::ValidationOutcome;
use sv_io::encoding::decode_strict;
use sv_io::ground_truth::load_concept_table;
use sv_io::table::Records;
use tracing::info;

use crate::{load_ground_truth, validate_submission, PipelineError};

#[derive(Clone, Debug)]
pub struct ScoreRequest {
    pub submission: PathBuf,
    pub primary_ground_truth: PathBuf,
    pub secondary_ground_truth: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ScoreRun {
    pub outcome: ValidationOutcome,
    /// Present only for a valid submission.
    pub scores: Option<ConceptScores>,
}

/// Image id → concept codes of an already-validated submission.
fn predictions(text: &str) -> HashMap<String, Vec<String>> {
    Records::new(text)
        .skip(1)
        .filter_map(Result::ok)
        .filter(|r| r.fields.len() == 2)
        .map(|r| {
            let codes = r.fields[1]
                .text
                .split(';')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned)
                .collect();
            (r.fields[0].text.to_string(), codes)
        })
        .collect()
}

pub fn run_scoring(req: &ScoreRequest) -> Result<ScoreRun, PipelineError> {
    let gt_paths = vec![req.primary_ground_truth.clone(), req.secondary_ground_truth.clone()];
    let canonical = match load_ground_truth(&gt_paths)? {
        Ok(seq) => seq,
        Err(e) => return Ok(ScoreRun { outcome: ValidationOutcome::Invalid(e), scores: None }),
    };
    let bytes = sv_io::read_bytes(&req.submission)?;

    let outcome = validate_submission(SubmissionSchema::Concept, &bytes, &canonical);
    if !outcome.is_valid() {
        return Ok(ScoreRun { outcome, scores: None });
    }

    // validated above, so decoding cannot fail here
    let text = decode_strict(&bytes).map_err(|e| PipelineError::Request(e.to_string()))?;
    let preds = predictions(text);
    let primary = load_concept_table(&req.primary_ground_truth)?;
    let secondary = load_concept_table(&req.secondary_ground_truth)?;
    let scores = score_concepts(&primary, &secondary, &preds);

    info!(primary = scores.primary, secondary = scores.secondary, images = preds.len(), "scored");
    Ok(ScoreRun { outcome, scores: Some(scores) })
}
