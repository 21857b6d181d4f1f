//! Concept-detection scoring (deterministic, model-free).
//!
//! For every ground-truth image the predicted and ground-truth concept sets
//! are upper-cased and compared with a binary F1 over their union. The score
//! is the mean over images whose ground truth is non-empty; images with an
//! empty ground-truth set are skipped and do not count in the denominator.
//!
//! - primary: against the primary ground truth, all concepts
//! - secondary: against the manual ground truth, both sides filtered to
//!   [`SECONDARY_ALLOWED_CUIS`]
//!
//! A ground-truth image absent from `predictions` is scored as an empty
//! prediction. Predictions for images outside the ground truth are ignored.

use std::collections::{BTreeSet, HashMap};

use crate::ImageId;

/// Concepts considered by the secondary score.
pub const SECONDARY_ALLOWED_CUIS: [&str; 15] = [
    "C0002978", "C0040405", "C0024485", "C0032743", "C0041618", "C1306645", "C1140618", "C0037949",
    "C0030797", "C0023216", "C0037303", "C0817096", "C0006141", "C0000726", "C0920367",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConceptScores {
    pub primary: f64,
    pub secondary: f64,
}

/// Binary F1 of `pred` against `truth`; 0 when there are no true positives.
pub fn f1_binary(pred: &BTreeSet<String>, truth: &BTreeSet<String>) -> f64 {
    let tp = pred.intersection(truth).count();
    if tp == 0 {
        return 0.0;
    }
    let fp = pred.len() - tp;
    let fn_ = truth.len() - tp;
    (2 * tp) as f64 / (2 * tp + fp + fn_) as f64
}

fn upper_set<'a, I>(concepts: I, allow: Option<&BTreeSet<&str>>) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    concepts
        .into_iter()
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .filter(|c| allow.map_or(true, |a| a.contains(c.as_str())))
        .collect()
}

fn mean_f1(
    truth: &[(ImageId, Vec<String>)],
    predictions: &HashMap<String, Vec<String>>,
    allow: Option<&BTreeSet<&str>>,
) -> f64 {
    let empty: Vec<String> = Vec::new();
    let mut total = 0.0f64;
    let mut counted = 0usize;
    for (image, gt) in truth {
        let gt = upper_set(gt, allow);
        if gt.is_empty() {
            continue;
        }
        let pred = upper_set(predictions.get(image.as_str()).unwrap_or(&empty), allow);
        total += f1_binary(&pred, &gt);
        counted += 1;
    }
    if counted == 0 {
        0.0
    } else {
        total / counted as f64
    }
}

/// Score `predictions` (image id → concept codes) against both ground truths.
pub fn score_concepts(
    primary: &[(ImageId, Vec<String>)],
    secondary: &[(ImageId, Vec<String>)],
    predictions: &HashMap<String, Vec<String>>,
) -> ConceptScores {
    let allow: BTreeSet<&str> = SECONDARY_ALLOWED_CUIS.iter().copied().collect();
    ConceptScores {
        primary: mean_f1(primary, predictions, None),
        secondary: mean_f1(secondary, predictions, Some(&allow)),
    }
}
