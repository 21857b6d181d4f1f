//! sv_core: Core types for submission validation.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! workspace (`sv_io`, `sv_algo`, `sv_pipeline`, `sv_report`, `sv_cli`):
//!
//! - Submission schemas (`ID,Caption` / `ID,CUIs`) and dataset splits
//! - Image IDs and CUI tokens
//! - The canonical, order-preserving ground-truth ID sequence
//! - The violation taxonomy and the single-error validation outcome
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod determinism;
pub mod ids;
pub mod schema;
pub mod sequence;
pub mod violation;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain parsing.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        EmptyId,
        UnknownSchema(String),
        UnknownSplit(String),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::EmptyId => write!(f, "empty image id"),
                CoreError::UnknownSchema(s) => write!(f, "unknown schema: {s} (expected caption|concept)"),
                CoreError::UnknownSplit(s) => write!(f, "unknown dataset split: {s} (expected valid|test)"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod prelude {
    pub use crate::errors::CoreError;
    pub use crate::ids::ImageId;
    pub use crate::schema::{Split, SubmissionSchema};
    pub use crate::sequence::{CanonicalIdSequence, SequenceBuilder};
    pub use crate::violation::{ValidationError, ValidationOutcome, ViolationKind};
}
