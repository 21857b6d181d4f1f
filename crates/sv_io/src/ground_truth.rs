//! Ground-truth loading.
//!
//! Ground-truth tables are organiser-provided and trusted more than
//! submissions, so they are read with the `csv` crate in flexible mode:
//! header optional, blank rows skipped, IDs trimmed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sv_core::ids::ImageId;
use sv_core::schema::SubmissionSchema;
use sv_core::sequence::{CanonicalIdSequence, SequenceBuilder};
use sv_core::violation::{ValidationError, ViolationKind};
use tracing::debug;

use crate::{IoError, IoResult};

fn open_reader(path: &Path) -> IoResult<csv::Reader<std::fs::File>> {
    if !path.is_file() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IoError::Csv { path: path.to_path_buf(), source })
}

fn header_error(path: &Path) -> IoError {
    IoError::GroundTruth(ValidationError::document(ViolationKind::MissingOrInvalidHeader {
        source: path.display().to_string(),
    }))
}

#[inline]
fn is_header_cell(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case(SubmissionSchema::ID_COLUMN)
}

/// Visit `(id, record)` for every data row of one ground-truth file, in file order.
fn for_each_row<F>(path: &Path, mut visit: F) -> IoResult<usize>
where
    F: FnMut(&str, &csv::StringRecord) -> IoResult<()>,
{
    let mut rdr = open_reader(path)?;
    let mut first = true;
    let mut rows = 0usize;
    for rec in rdr.records() {
        let rec = rec.map_err(|source| IoError::Csv { path: path.to_path_buf(), source })?;
        let id = rec.get(0).unwrap_or("").trim();
        if first {
            first = false;
            if id.is_empty() {
                return Err(header_error(path));
            }
            if is_header_cell(id) {
                continue;
            }
        }
        if id.is_empty() {
            continue;
        }
        visit(id, &rec)?;
        rows += 1;
    }
    if first {
        return Err(header_error(path));
    }
    Ok(rows)
}

/// Build the canonical ID sequence from `paths`, in priority order.
///
/// IDs already contributed by an earlier row or file are skipped; the result
/// is never re-ordered.
pub fn load_canonical_ids<P: AsRef<Path>>(paths: &[P]) -> IoResult<CanonicalIdSequence> {
    let mut builder = SequenceBuilder::default();
    for p in paths {
        let path = p.as_ref();
        let before = builder.len();
        let rows = for_each_row(path, |id, _| {
            builder.push(id);
            Ok(())
        })?;
        debug!(path = %path.display(), rows, added = builder.len() - before, "ground truth ids loaded");
    }
    Ok(builder.finish())
}

/// `(image id, concept codes)` per image of a concept ground-truth file, in
/// first-seen order. Codes are split on `;`, trimmed, and empty codes dropped.
/// A repeated image keeps its first position and takes the codes of its last row.
pub fn load_concept_table(path: &Path) -> IoResult<Vec<(ImageId, Vec<String>)>> {
    let mut out: Vec<(ImageId, Vec<String>)> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();
    let to_path = PathBuf::from(path);
    for_each_row(path, |id, rec| {
        let Some(raw) = rec.get(1) else {
            return Err(IoError::GroundTruthFormat {
                path: to_path.clone(),
                msg: format!("row for '{id}' has no concept column"),
            });
        };
        let image: ImageId = id
            .parse()
            .map_err(|e| IoError::GroundTruthFormat { path: to_path.clone(), msg: format!("{e}") })?;
        let concepts = raw
            .split(';')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
            .collect();
        match slot.get(id) {
            Some(&i) => out[i].1 = concepts,
            None => {
                slot.insert(id.to_string(), out.len());
                out.push((image, concepts));
            }
        }
        Ok(())
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, body).unwrap();
        p
    }

    fn ids(seq: &CanonicalIdSequence) -> Vec<&str> {
        seq.iter().map(ImageId::as_str).collect()
    }

    #[test]
    fn header_is_optional_and_order_is_kept() {
        let dir = TempDir::new().unwrap();
        let with = write(&dir, "a.csv", "ID,Caption\nim2,x\nim1,y\n");
        let without = write(&dir, "b.csv", "im2,x\n\nim1,y\n");
        assert_eq!(ids(&load_canonical_ids(&[with]).unwrap()), ["im2", "im1"]);
        assert_eq!(ids(&load_canonical_ids(&[without]).unwrap()), ["im2", "im1"]);
    }

    #[test]
    fn lowercase_header_is_detected() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "a.csv", "Id,CUIs\n im1 ,C1\n");
        assert_eq!(ids(&load_canonical_ids(&[p]).unwrap()), ["im1"]);
    }

    #[test]
    fn secondary_file_only_adds_new_ids() {
        let dir = TempDir::new().unwrap();
        let primary = write(&dir, "concepts.csv", "ID,CUIs\nim1,C1\nim2,C2\n");
        let manual = write(&dir, "concepts_manual.csv", "ID,CUIs\nim2,C2\nim0,C3\nim1,\n");
        let seq = load_canonical_ids(&[primary, manual]).unwrap();
        assert_eq!(ids(&seq), ["im1", "im2", "im0"]);
    }

    #[test]
    fn empty_file_fails_header_check() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "empty.csv", "");
        match load_canonical_ids(&[p]).unwrap_err() {
            IoError::GroundTruth(e) => assert_eq!(e.code(), "MissingOrInvalidHeader"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_first_column_fails_header_check() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "bad.csv", ",Caption\nim1,x\n");
        assert!(matches!(load_canonical_ids(&[p]), Err(IoError::GroundTruth(_))));
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("nope.csv");
        assert!(matches!(load_canonical_ids(&[p]), Err(IoError::NotFound(_))));
    }

    #[test]
    fn concept_table_splits_codes() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "c.csv", "ID,CUIs\nim1,C1; C2\nim2,\n");
        let rows = load_concept_table(&p).unwrap();
        assert_eq!(rows[0].1, vec!["C1".to_string(), "C2".to_string()]);
        assert!(rows[1].1.is_empty());
    }

    #[test]
    fn concept_table_counts_each_image_once() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "c.csv", "ID,CUIs\nim1,C1\nim2,C2\nim1,C7;C8\n");
        let rows = load_concept_table(&p).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.as_str(), "im1");
        assert_eq!(rows[0].1, vec!["C7".to_string(), "C8".to_string()]);
        assert_eq!(rows[1].0.as_str(), "im2");
    }

    #[test]
    fn concept_table_requires_second_column() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "c.csv", "ID,CUIs\nim1\n");
        assert!(matches!(load_concept_table(&p), Err(IoError::GroundTruthFormat { .. })));
    }
}
