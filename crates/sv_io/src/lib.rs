//! crates/sv_io/src/lib.rs
//! I/O layer for the submission validator.
//!
//! - Strict UTF-8 decoding and the quote-aware blank-line scan (`encoding`)
//! - Lazy, quote-aware two-column tokenizer with per-field quoting metadata (`table`)
//! - Ground-truth loading into a canonical ID sequence (`ground_truth`)
//! - Default ground-truth layout and JSON manifests (`layout`, `manifest`)
//! - Canonical JSON and SHA-256 helpers for reports (`canonical_json`, `hasher`)
//!
//! Shared error type (`IoError`) covers *fatal* conditions only. Format
//! violations found in ground-truth files travel inside `IoError::GroundTruth`
//! so callers can surface them as ordinary validation failures.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use sv_core::violation::ValidationError;
use thiserror::Error;

/// Unified error for sv_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// A required input file does not exist or is not a regular file.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading a file failed.
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a file failed.
    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem / path errors without a better home.
    #[error("io/path error: {0}")]
    Path(String),

    /// The CSV reader failed on a ground-truth file.
    #[error("csv error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Ground-truth table has a shape the scorer cannot use.
    #[error("ground truth format error in {}: {msg}", path.display())]
    GroundTruthFormat { path: PathBuf, msg: String },

    /// A ground-truth file violates the header invariant.
    #[error("{0}")]
    GroundTruth(ValidationError),

    /// JSON serialization/deserialization errors with an optional JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Manifest shape / offline-policy violations.
    #[error("manifest: {0}")]
    Manifest(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json doesn't keep a pointer; callers may enrich this at higher layers.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod encoding;
pub mod ground_truth;
#[cfg(feature = "hash")]
pub mod hasher;
pub mod layout;
pub mod manifest;
pub mod table;

/// Read a whole file as raw bytes, distinguishing "missing" from other failures.
pub fn read_bytes(path: &std::path::Path) -> IoResult<Vec<u8>> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(IoError::NotFound(path.to_path_buf())),
    }
    std::fs::read(path).map_err(|source| IoError::Read { path: path.to_path_buf(), source })
}

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, read_bytes, IoError, IoResult};

    pub use crate::encoding::{decode_strict, BlankLines};
    pub use crate::ground_truth::{load_canonical_ids, load_concept_table};
    pub use crate::layout::default_ground_truth;
    pub use crate::manifest::{load_manifest, Manifest, ResolvedManifest};
    pub use crate::table::{Field, Quoting, Record, Records, TableError};
}
