//! Default on-disk layout of the challenge data.
//!
//! ```text
//! <data_root>/<split>/captions.csv
//! <data_root>/<split>/concepts.csv
//! <data_root>/<split>/concepts_manual.csv
//! ```

use std::path::{Path, PathBuf};

use sv_core::schema::{Split, SubmissionSchema};

use crate::{IoError, IoResult};

pub const DEFAULT_DATA_ROOT: &str = "data";

/// Ground-truth files for `schema`, in priority order.
pub fn default_ground_truth(schema: SubmissionSchema, split: Split, data_root: &Path) -> Vec<PathBuf> {
    let dir = data_root.join(split.as_str());
    schema.ground_truth_files().iter().map(|f| dir.join(f)).collect()
}

/// Fail on the first path that is not an existing regular file.
pub fn ensure_present<P: AsRef<Path>>(paths: &[P]) -> IoResult<()> {
    if paths.is_empty() {
        return Err(IoError::Path("no ground-truth files given".into()));
    }
    for p in paths {
        let p = p.as_ref();
        if !p.is_file() {
            return Err(IoError::NotFound(p.to_path_buf()));
        }
    }
    Ok(())
}
