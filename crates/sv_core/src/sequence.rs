//! Canonical ground-truth ID sequence.
//!
//! Order is the contract: a submission must list these IDs position for
//! position. Entries are unique; first-seen order wins. The sequence is never
//! sorted and cannot be mutated once built.

use std::collections::HashSet;

use crate::ids::ImageId;

/// Immutable, de-duplicated, order-preserving list of ground-truth IDs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalIdSequence {
    ids: Vec<ImageId>,
    index: HashSet<ImageId>,
}

impl CanonicalIdSequence {
    /// Build from IDs in priority order, dropping repeats.
    pub fn from_ordered<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut b = SequenceBuilder::default();
        for id in ids {
            b.push(id);
        }
        b.finish()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entry expected at `position` (0-based).
    #[inline]
    pub fn get(&self, position: usize) -> Option<&ImageId> {
        self.ids.get(position)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageId> + '_ {
        self.ids.iter()
    }
}

/// Accumulates IDs from one or more ground-truth files.
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    ids: Vec<ImageId>,
    index: HashSet<ImageId>,
}

impl SequenceBuilder {
    /// Append `id` unless already present. Empty IDs are ignored.
    /// Returns true when the ID was appended.
    pub fn push<S: Into<String>>(&mut self, id: S) -> bool {
        let id: String = id.into();
        if id.is_empty() || self.index.contains(id.as_str()) {
            return false;
        }
        let Ok(id) = id.parse::<ImageId>() else { return false };
        self.index.insert(id.clone());
        self.ids.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn finish(self) -> CanonicalIdSequence {
        CanonicalIdSequence { ids: self.ids, index: self.index }
    }
}
