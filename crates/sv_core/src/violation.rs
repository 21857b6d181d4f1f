//! Violation taxonomy and the validation outcome.
//!
//! Every kind corresponds to exactly one format invariant. Kinds are values,
//! not control flow: the engine returns them inside [`ValidationOutcome`].
//! Fatal conditions (I/O, missing files) live in the error types of the
//! crates that perform I/O.

use core::fmt;

/// What went wrong, with the offending/expected values needed for a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Submission bytes are not valid UTF-8.
    Encoding { offset: usize, detail: String },
    /// Empty or whitespace-only line after line 1.
    BlankLine,
    /// A ground-truth file has no rows or an empty first ID column.
    MissingOrInvalidHeader { source: String },
    /// Submission header is missing or differs from the schema's two columns.
    InvalidHeader { expected: String, found: Option<Vec<String>> },
    /// Data row without exactly two fields.
    RowShape { fields: usize },
    /// Malformed quoting reported by the tokenizer.
    TableParse { detail: String },
    IdWhitespace { id: String },
    DuplicateId { id: String },
    /// More rows than the ground truth has IDs.
    ExtraId { id: String },
    /// `position` is 1-based.
    OrderMismatch { expected: String, found: String, position: usize },
    UnknownId { id: String },
    /// Concept payload differs from its trimmed form.
    FieldWhitespace { value: String },
    /// Caption containing a comma was not a quoted field.
    UnquotedComma,
    EmptyCui,
    InvalidCuiFormat { tokens: Vec<String> },
    DuplicateCui { duplicates: Vec<String> },
    IncompleteSubmission { missing: usize, sample: Vec<String> },
}

/// Stable error codes, one per kind (table order = pipeline order).
pub const CODES: &[&str] = &[
    "EncodingError",
    "BlankLineError",
    "MissingOrInvalidHeader",
    "InvalidHeaderError",
    "RowShapeError",
    "TableParseError",
    "IdWhitespaceError",
    "DuplicateIdError",
    "ExtraIdError",
    "OrderMismatchError",
    "UnknownIdError",
    "FieldWhitespaceError",
    "UnquotedCommaError",
    "EmptyCuiError",
    "InvalidCuiFormatError",
    "DuplicateCuiError",
    "IncompleteSubmissionError",
];

impl ViolationKind {
    /// Stable, machine-readable code.
    pub fn code(&self) -> &'static str {
        use ViolationKind::*;
        let idx = match self {
            Encoding { .. } => 0,
            BlankLine => 1,
            MissingOrInvalidHeader { .. } => 2,
            InvalidHeader { .. } => 3,
            RowShape { .. } => 4,
            TableParse { .. } => 5,
            IdWhitespace { .. } => 6,
            DuplicateId { .. } => 7,
            ExtraId { .. } => 8,
            OrderMismatch { .. } => 9,
            UnknownId { .. } => 10,
            FieldWhitespace { .. } => 11,
            UnquotedComma => 12,
            EmptyCui => 13,
            InvalidCuiFormat { .. } => 14,
            DuplicateCui { .. } => 15,
            IncompleteSubmission { .. } => 16,
        };
        CODES[idx]
    }

    /// After one of these nothing further in the document can be trusted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ViolationKind::Encoding { .. }
                | ViolationKind::MissingOrInvalidHeader { .. }
                | ViolationKind::InvalidHeader { .. }
                | ViolationKind::TableParse { .. }
        )
    }
}

fn list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ViolationKind::*;
        match self {
            Encoding { offset, detail } => write!(
                f,
                "File encoding error: submission must be UTF-8 (invalid byte sequence at offset {offset}): {detail}"
            ),
            BlankLine => write!(f, "Empty line detected: the submission must not contain blank lines"),
            MissingOrInvalidHeader { source } => {
                write!(f, "Ground truth file header missing or invalid: {source}")
            }
            InvalidHeader { expected, found: None } => {
                write!(f, "Missing header row. Expected columns: {expected}")
            }
            InvalidHeader { expected, found: Some(cols) } => write!(
                f,
                "Invalid header. Expected exactly two columns: {expected}. Found: {}",
                list(cols)
            ),
            RowShape { fields } => write!(f, "Expected exactly 2 columns, found {fields}"),
            TableParse { detail } => write!(f, "CSV parsing error: {detail}"),
            IdWhitespace { id } => write!(f, "ID has leading/trailing whitespace. Found: '{id}'"),
            DuplicateId { id } => write!(f, "Duplicate ID detected: {id}"),
            ExtraId { id } => write!(f, "Extra ID beyond ground truth length: {id}"),
            OrderMismatch { expected, found, position } => write!(
                f,
                "ID order mismatch. Expected '{expected}' at position {position}, found '{found}'"
            ),
            UnknownId { id } => write!(f, "ID '{id}' not found in ground truth set"),
            FieldWhitespace { value } => {
                write!(f, "CUIs field has leading/trailing whitespace. Found: '{value}'")
            }
            UnquotedComma => write!(f, "Caption contains a comma but is not enclosed in double quotes"),
            EmptyCui => write!(
                f,
                "Empty CUI detected (possible trailing ';' or consecutive separators)"
            ),
            InvalidCuiFormat { tokens } => write!(
                f,
                "Invalid CUI format for entries: {}. Expected 'C' followed by digits",
                list(tokens)
            ),
            DuplicateCui { duplicates } => write!(
                f,
                "Duplicate CUIs not allowed for an ID. Duplicates: {}",
                list(duplicates)
            ),
            IncompleteSubmission { missing, sample } => write!(
                f,
                "Submission incomplete: {missing} official IDs are missing. Example: {}",
                list(sample)
            ),
        }
    }
}

/// One violation with its location. `line` is 1-based and absent for
/// document-level findings (ground-truth headers, completeness).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ViolationKind,
    pub line: Option<usize>,
}

impl ValidationError {
    pub fn at(line: usize, kind: ViolationKind) -> Self {
        ValidationError { kind, line: Some(line) }
    }

    pub fn document(kind: ViolationKind) -> Self {
        ValidationError { kind, line: None }
    }

    #[inline]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "Row {line}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of a fail-fast validation: success or exactly one error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(ValidationError),
}

impl ValidationOutcome {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationOutcome::Valid => Ok(()),
            ValidationOutcome::Invalid(e) => Err(e),
        }
    }
}

impl From<Option<ValidationError>> for ValidationOutcome {
    fn from(first: Option<ValidationError>) -> Self {
        match first {
            None => ValidationOutcome::Valid,
            Some(e) => ValidationOutcome::Invalid(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique_and_complete() {
        let mut sorted = CODES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 17);
        assert_eq!(ViolationKind::UnquotedComma.code(), "UnquotedCommaError");
        assert_eq!(
            ViolationKind::IncompleteSubmission { missing: 1, sample: vec![] }.code(),
            "IncompleteSubmissionError"
        );
    }

    #[test]
    fn display_carries_line_and_context() {
        let e = ValidationError::at(
            3,
            ViolationKind::OrderMismatch { expected: "im2".into(), found: "im3".into(), position: 2 },
        );
        assert_eq!(
            e.to_string(),
            "Row 3: ID order mismatch. Expected 'im2' at position 2, found 'im3'"
        );
        let doc = ValidationError::document(ViolationKind::IncompleteSubmission {
            missing: 2,
            sample: vec!["a".into(), "b".into()],
        });
        assert_eq!(
            doc.to_string(),
            "Submission incomplete: 2 official IDs are missing. Example: ['a', 'b']"
        );
    }

    #[test]
    fn outcome_from_first_violation() {
        assert!(ValidationOutcome::from(None).is_valid());
        let o = ValidationOutcome::from(Some(ValidationError::at(2, ViolationKind::EmptyCui)));
        assert_eq!(o.error().map(ValidationError::code), Some("EmptyCuiError"));
        assert!(o.into_result().is_err());
    }

    #[test]
    fn terminal_kinds() {
        assert!(ViolationKind::TableParse { detail: String::new() }.is_terminal());
        assert!(!ViolationKind::BlankLine.is_terminal());
        assert!(!ViolationKind::DuplicateId { id: "x".into() }.is_terminal());
    }
}
