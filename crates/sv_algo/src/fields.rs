//! Field content rules.
//!
//! Inputs are the payload column of one data row as the tokenizer produced
//! it: the decoded text plus whether it was a cleanly quoted field.
//!
//! Caption:
//! - a caption containing `,` must have been quoted; leading/trailing
//!   whitespace is allowed.
//!
//! Concept (checked in this order, first failure wins):
//! 1. payload equals its trimmed form
//! 2. empty payload is valid (no concepts)
//! 3. no empty token after splitting on `;` and trimming
//! 4. every token is `C` + ASCII digits (all offenders reported, in order)
//! 5. no token repeated (duplicates reported sorted)

use std::collections::BTreeSet;

use sv_core::determinism::sorted_duplicates;
use sv_core::ids::is_valid_cui;

use crate::{SubmissionSchema, ViolationKind};

pub const CUI_SEPARATOR: char = ';';

/// The payload column of one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadView<'a> {
    pub text: &'a str,
    /// Enclosed in quotes with nothing after the closing quote.
    pub quoted: bool,
}

/// Caption rule.
pub fn check_caption(payload: PayloadView<'_>) -> Option<ViolationKind> {
    if payload.text.contains(',') && !payload.quoted {
        return Some(ViolationKind::UnquotedComma);
    }
    None
}

/// Concept rules. Quoting is irrelevant here: `"C1;C2"` and `C1;C2` are the same list.
pub fn check_concepts(payload: &str) -> Option<ViolationKind> {
    if payload != payload.trim() {
        return Some(ViolationKind::FieldWhitespace { value: payload.to_string() });
    }
    if payload.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = payload.split(CUI_SEPARATOR).map(str::trim).collect();
    if tokens.iter().any(|t| t.is_empty()) {
        return Some(ViolationKind::EmptyCui);
    }

    let invalid: Vec<String> = tokens.iter().filter(|t| !is_valid_cui(t)).map(|t| t.to_string()).collect();
    if !invalid.is_empty() {
        return Some(ViolationKind::InvalidCuiFormat { tokens: invalid });
    }

    let distinct: BTreeSet<&str> = tokens.iter().copied().collect();
    if distinct.len() != tokens.len() {
        return Some(ViolationKind::DuplicateCui { duplicates: sorted_duplicates(tokens) });
    }
    None
}

/// Dispatch on schema.
#[inline]
pub fn check_field(schema: SubmissionSchema, payload: PayloadView<'_>) -> Option<ViolationKind> {
    match schema {
        SubmissionSchema::Caption => check_caption(payload),
        SubmissionSchema::Concept => check_concepts(payload.text),
    }
}
