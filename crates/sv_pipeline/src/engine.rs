//! crates/sv_pipeline/src/engine.rs
//! The validation state machine as a lazy sequence of violations.
//!
//! Phases: `Blank → Header → Rows → Completeness → Done`.
//! Fail-fast takes the first item; collect mode drains the iterator.
//!
//! - an encoding failure is the only item when the bytes are not UTF-8
//! - every blank line is reported before anything structural
//! - header and tokenizer failures end the sequence
//! - each data row yields at most one positional and one field violation
//! - completeness is reported last, once

use std::collections::VecDeque;

use sv_algo::fields::{check_field, PayloadView};
use sv_core::determinism::sorted_sample;
use sv_core::schema::SubmissionSchema;
use sv_core::sequence::CanonicalIdSequence;
use sv_core::violation::{ValidationError, ValidationOutcome, ViolationKind};
use sv_io::encoding::{decode_strict, BlankLines};
use sv_io::table::{Record, Records};
use tracing::debug;

use crate::cursor::ValidationCursor;

/// How many missing IDs an incompleteness message lists.
pub const MISSING_SAMPLE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Blank,
    Header,
    Rows,
    Completeness,
    Done,
}

/// Lazy violation sequence over one submission.
pub struct Violations<'a> {
    schema: SubmissionSchema,
    phase: Phase,
    blanks: Option<BlankLines<'a>>,
    records: Option<Records<'a>>,
    cursor: ValidationCursor<'a>,
    pending: VecDeque<ValidationError>,
    rows_scanned: usize,
}

impl<'a> Violations<'a> {
    pub fn new(schema: SubmissionSchema, bytes: &'a [u8], canonical: &'a CanonicalIdSequence) -> Self {
        let mut v = Violations {
            schema,
            phase: Phase::Blank,
            blanks: None,
            records: None,
            cursor: ValidationCursor::new(canonical),
            pending: VecDeque::new(),
            rows_scanned: 0,
        };
        match decode_strict(bytes) {
            Ok(text) => {
                v.blanks = Some(BlankLines::new(text));
                v.records = Some(Records::new(text));
            }
            Err(e) => {
                v.pending.push_back(e);
                v.phase = Phase::Done;
            }
        }
        v
    }

    /// Data rows checked so far (header and blank records excluded).
    pub fn rows_scanned(&self) -> usize {
        self.rows_scanned
    }

    /// First violation, if any.
    pub fn first(mut self) -> ValidationOutcome {
        self.next().into()
    }

    fn terminate(&mut self, err: ValidationError) -> Option<ValidationError> {
        debug!(code = err.code(), line = ?err.line, "validation stopped");
        self.phase = Phase::Done;
        Some(err)
    }

    fn next_blank(&mut self) -> Option<ValidationError> {
        let line = self.blanks.as_mut()?.next()?;
        Some(ValidationError::at(line, ViolationKind::BlankLine))
    }

    fn check_header(&mut self) -> Option<ValidationError> {
        let expected = self.schema.header_line();
        let first = self.records.as_mut().and_then(Iterator::next);
        match first {
            None => self.terminate(ValidationError::at(1, ViolationKind::InvalidHeader { expected, found: None })),
            Some(Err(e)) => {
                let line = e.line();
                self.terminate(ValidationError::at(line, ViolationKind::TableParse { detail: e.to_string() }))
            }
            Some(Ok(rec)) => {
                let cols = rec.texts();
                if cols.len() == 2 && cols.iter().zip(self.schema.header()).all(|(c, h)| c == h) {
                    debug!(schema = %self.schema, "header ok");
                    None
                } else {
                    self.terminate(ValidationError::at(
                        rec.line,
                        ViolationKind::InvalidHeader { expected, found: Some(cols) },
                    ))
                }
            }
        }
    }

    fn check_row(&mut self, rec: &Record<'_>) {
        if rec.fields.len() != 2 {
            self.pending.push_back(ValidationError::at(rec.line, ViolationKind::RowShape { fields: rec.fields.len() }));
            return;
        }
        self.rows_scanned += 1;
        let id = rec.fields[0].text.as_ref();
        if let Err(kind) = self.cursor.step(id) {
            self.pending.push_back(ValidationError::at(rec.line, kind));
        }
        let payload = &rec.fields[1];
        let view = PayloadView { text: payload.text.as_ref(), quoted: payload.is_cleanly_quoted() };
        if let Some(kind) = check_field(self.schema, view) {
            self.pending.push_back(ValidationError::at(rec.line, kind));
        }
    }

    fn check_completeness(&self) -> Option<ValidationError> {
        let missing: Vec<&str> = self.cursor.missing().collect();
        debug!(rows = self.rows_scanned, missing = missing.len(), "rows done");
        if missing.is_empty() {
            return None;
        }
        Some(ValidationError::document(ViolationKind::IncompleteSubmission {
            missing: missing.len(),
            sample: sorted_sample(missing, MISSING_SAMPLE),
        }))
    }
}

impl Iterator for Violations<'_> {
    type Item = ValidationError;

    fn next(&mut self) -> Option<ValidationError> {
        loop {
            if let Some(e) = self.pending.pop_front() {
                return Some(e);
            }
            match self.phase {
                Phase::Blank => match self.next_blank() {
                    Some(e) => return Some(e),
                    None => self.phase = Phase::Header,
                },
                Phase::Header => {
                    self.phase = Phase::Rows;
                    if let Some(e) = self.check_header() {
                        return Some(e);
                    }
                }
                Phase::Rows => {
                    let next = self.records.as_mut().and_then(Iterator::next);
                    match next {
                        None => self.phase = Phase::Completeness,
                        Some(Err(e)) => {
                            let line = e.line();
                            return self
                                .terminate(ValidationError::at(line, ViolationKind::TableParse { detail: e.to_string() }));
                        }
                        Some(Ok(rec)) if rec.is_blank() => {}
                        Some(Ok(rec)) => self.check_row(&rec),
                    }
                }
                Phase::Completeness => {
                    self.phase = Phase::Done;
                    if let Some(e) = self.check_completeness() {
                        return Some(e);
                    }
                }
                Phase::Done => return None,
            }
        }
    }
}
