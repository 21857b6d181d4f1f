//! render_json.rs: canonical JSON report.
//!
//! Keys are sorted and output is compact, so the same run always yields the
//! same bytes (and the same SHA-256).

use crate::{ReportError, ReportModel};

pub fn render_json(model: &ReportModel) -> Result<Vec<u8>, ReportError> {
    sv_io::canonical_json::to_canonical_bytes(model).map_err(|e| ReportError::Serialize(e.to_string()))
}
