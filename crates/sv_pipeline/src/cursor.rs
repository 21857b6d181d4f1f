//! crates/sv_pipeline/src/cursor.rs
//! Positional/uniqueness checks against the canonical ID sequence.
//!
//! Per row, in order (first failure wins):
//! 1. ID has no leading/trailing whitespace
//! 2. ID not seen before
//! 3. position < canonical length
//! 4. ID equals canonical[position]
//! 5. ID is a canonical member

use std::collections::HashSet;

use sv_core::sequence::CanonicalIdSequence;
use sv_core::violation::ViolationKind;

/// Rows accepted so far (next expected position) and the set of IDs seen.
/// One cursor per validation run.
#[derive(Debug)]
pub struct ValidationCursor<'g> {
    canonical: &'g CanonicalIdSequence,
    position: usize,
    seen: HashSet<String>,
}

impl<'g> ValidationCursor<'g> {
    pub fn new(canonical: &'g CanonicalIdSequence) -> Self {
        ValidationCursor { canonical, position: 0, seen: HashSet::with_capacity(canonical.len()) }
    }

    /// Next expected 0-based position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Run the positional checks for `id` without touching the cursor.
    pub fn check(&self, id: &str) -> Result<(), ViolationKind> {
        if id != id.trim() {
            return Err(ViolationKind::IdWhitespace { id: id.to_string() });
        }
        if self.seen.contains(id) {
            return Err(ViolationKind::DuplicateId { id: id.to_string() });
        }
        let Some(expected) = self.canonical.get(self.position) else {
            return Err(ViolationKind::ExtraId { id: id.to_string() });
        };
        if expected.as_str() != id {
            return Err(ViolationKind::OrderMismatch {
                expected: expected.to_string(),
                found: id.to_string(),
                position: self.position + 1,
            });
        }
        if !self.canonical.contains(id) {
            return Err(ViolationKind::UnknownId { id: id.to_string() });
        }
        Ok(())
    }

    /// Record `id` as seen and advance to the next position.
    pub fn accept(&mut self, id: &str) {
        self.seen.insert(id.trim().to_string());
        self.position += 1;
    }

    /// Check and, when appropriate, record `id`.
    ///
    /// A row that failed with whitespace, order or membership still occupies
    /// its slot; a duplicate or surplus row does not.
    pub fn step(&mut self, id: &str) -> Result<(), ViolationKind> {
        let res = self.check(id);
        match &res {
            Ok(())
            | Err(ViolationKind::IdWhitespace { .. })
            | Err(ViolationKind::OrderMismatch { .. })
            | Err(ViolationKind::UnknownId { .. }) => self.accept(id),
            Err(_) => {}
        }
        res
    }

    /// Canonical IDs not seen, in canonical order.
    pub fn missing(&self) -> impl Iterator<Item = &'g str> + '_ {
        let canonical: &'g CanonicalIdSequence = self.canonical;
        let seen = &self.seen;
        canonical.iter().map(|id| id.as_str()).filter(move |id| !seen.contains(*id))
    }
}
