//! Submission schemas and dataset splits.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// The two accepted submission layouts. Both are two-column UTF-8 tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SubmissionSchema {
    /// `ID,Caption`: free-text caption per image.
    Caption,
    /// `ID,CUIs`: semicolon-joined concept codes per image (possibly empty).
    Concept,
}

impl SubmissionSchema {
    pub const ID_COLUMN: &'static str = "ID";

    /// Exact, case-sensitive header columns.
    pub fn header(self) -> [&'static str; 2] {
        [Self::ID_COLUMN, self.payload_column()]
    }

    pub fn payload_column(self) -> &'static str {
        match self {
            SubmissionSchema::Caption => "Caption",
            SubmissionSchema::Concept => "CUIs",
        }
    }

    /// Header as it appears on line 1 of a valid submission.
    pub fn header_line(self) -> String {
        self.header().join(",")
    }

    /// Ground-truth file names inside a split directory, in merge priority order.
    pub fn ground_truth_files(self) -> &'static [&'static str] {
        match self {
            SubmissionSchema::Caption => &["captions.csv"],
            SubmissionSchema::Concept => &["concepts.csv", "concepts_manual.csv"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionSchema::Caption => "caption",
            SubmissionSchema::Concept => "concept",
        }
    }
}

impl fmt::Display for SubmissionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionSchema {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "caption" | "captions" | "caption_prediction" => Ok(SubmissionSchema::Caption),
            "concept" | "concepts" | "concept_detection" => Ok(SubmissionSchema::Concept),
            _ => Err(CoreError::UnknownSchema(s.to_string())),
        }
    }
}

/// Dataset split used to resolve default ground-truth locations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Split {
    #[default]
    Valid,
    Test,
}

impl Split {
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valid" => Ok(Split::Valid),
            "test" => Ok(Split::Test),
            _ => Err(CoreError::UnknownSplit(s.to_string())),
        }
    }
}
