//! crates/sv_io/src/manifest.rs
//!
//! Optional JSON manifest describing one validation run. Every field is
//! optional; CLI flags given alongside a manifest take precedence.
//!
//! ```json
//! {
//!   "schema": "concept",
//!   "split": "valid",
//!   "data_root": "../data",
//!   "ground_truth": ["gt/concepts.csv", "gt/concepts_manual.csv"],
//!   "submission": "run1.csv"
//! }
//! ```
//!
//! Rules:
//! - unknown keys are rejected;
//! - paths are offline only (no `<scheme>://`);
//! - relative paths resolve against the manifest's directory;
//! - `ground_truth`, when present, must be non-empty and wins over `data_root`.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sv_core::schema::{Split, SubmissionSchema};

use crate::{looks_like_url_strict, IoError, IoResult};

const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

/// External manifest as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub schema: Option<SubmissionSchema>,
    #[serde(default)]
    pub split: Option<Split>,
    #[serde(default)]
    pub data_root: Option<String>,
    #[serde(default)]
    pub ground_truth: Option<Vec<String>>,
    #[serde(default)]
    pub submission: Option<String>,
}

/// Manifest with paths joined onto the manifest's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedManifest {
    pub schema: Option<SubmissionSchema>,
    pub split: Option<Split>,
    pub data_root: Option<PathBuf>,
    pub ground_truth: Option<Vec<PathBuf>>,
    pub submission: Option<PathBuf>,
}

#[inline]
fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn offline_path(label: &str, raw: &str) -> IoResult<()> {
    if raw.trim().is_empty() {
        return Err(IoError::Manifest(format!("field must not be empty: {label}")));
    }
    if looks_like_url_strict(raw) {
        return Err(IoError::Manifest(format!("path must be offline (no scheme) for {label}: {raw}")));
    }
    Ok(())
}

/// Shape and offline checks. No I/O.
pub fn validate_manifest(man: &Manifest) -> IoResult<()> {
    if let Some(root) = &man.data_root {
        offline_path("data_root", root)?;
    }
    if let Some(sub) = &man.submission {
        offline_path("submission", sub)?;
    }
    if let Some(gt) = &man.ground_truth {
        if gt.is_empty() {
            return Err(IoError::Manifest("ground_truth must list at least one file".into()));
        }
        if gt.len() > 2 {
            return Err(IoError::Manifest(format!("ground_truth lists {} files (at most 2)", gt.len())));
        }
        for p in gt {
            offline_path("ground_truth", p)?;
        }
    }
    Ok(())
}

impl Manifest {
    /// Join every path onto `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> ResolvedManifest {
        ResolvedManifest {
            schema: self.schema,
            split: self.split,
            data_root: self.data_root.as_deref().map(|s| join_under(base_dir, s)),
            ground_truth: self
                .ground_truth
                .as_ref()
                .map(|v| v.iter().map(|s| join_under(base_dir, s)).collect()),
            submission: self.submission.as_deref().map(|s| join_under(base_dir, s)),
        }
    }
}

/// Parse a manifest from JSON bytes and validate its shape.
pub fn parse_manifest(bytes: &[u8]) -> IoResult<Manifest> {
    let man: Manifest = serde_json::from_slice(bytes)?;
    validate_manifest(&man)?;
    Ok(man)
}

/// Load, validate and resolve the manifest at `path`.
pub fn load_manifest(path: &Path) -> IoResult<ResolvedManifest> {
    if !path.is_file() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let f = fs::File::open(path).map_err(|source| IoError::Read { path: path.to_path_buf(), source })?;
    let mut buf = Vec::new();
    f.take(MAX_MANIFEST_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|source| IoError::Read { path: path.to_path_buf(), source })?;
    if buf.len() as u64 > MAX_MANIFEST_BYTES {
        return Err(IoError::Manifest(format!("{} exceeds {MAX_MANIFEST_BYTES} bytes", path.display())));
    }

    let man = parse_manifest(&buf)?;
    let base = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(man.resolve(&base))
}
