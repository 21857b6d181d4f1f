// crates/sv_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure, I/O-free rules applied to already-tokenized submission content.
//!
//! - `fields`: per-row payload rules for the caption and concept schemas
//! - `concept_f1`: model-free concept-detection scoring

pub use sv_core::{
    ids::ImageId,
    schema::SubmissionSchema,
    violation::ViolationKind,
};

#[cfg(feature = "fields")]
pub mod fields;

#[cfg(feature = "scoring")]
pub mod concept_f1;

// Convenience re-exports (pipeline imports these from crate root)
#[cfg(feature = "fields")]
pub use fields::{check_caption, check_concepts, check_field, PayloadView};

#[cfg(feature = "scoring")]
pub use concept_f1::{f1_binary, score_concepts, ConceptScores, SECONDARY_ALLOWED_CUIS};
