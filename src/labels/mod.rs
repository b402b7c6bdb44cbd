//! Durable label storage: the long-format store of record and its derived
//! wide projection.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::corpus::CommentId;

pub mod category;
pub mod long_store;
pub mod wide;

pub use category::{Category, CategoryError, CategorySet, DEFAULT_CATEGORIES};
pub use long_store::{LongStore, PersistOutcome};
pub use wide::{WideRow, WideStore};

/// Binary judgment for one comment in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    False,
    True,
}

impl Label {
    /// Stored representation (`0` or `1`).
    pub fn as_u8(self) -> u8 {
        match self {
            Label::False => 0,
            Label::True => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::False => "0",
            Label::True => "1",
        }
    }

    pub fn is_true(self) -> bool {
        self == Label::True
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        if value { Label::True } else { Label::False }
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "0" | "0.0" => Ok(Label::False),
            "1" | "1.0" => Ok(Label::True),
            other => Err(format!("expected 0 or 1, found {other:?}")),
        }
    }
}

/// In-session labels for one category, keyed by comment.
pub type LabelsMap = BTreeMap<CommentId, Label>;

/// One row of the long-format store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub comment_id: CommentId,
    pub comment_text: String,
    /// Stored as text so records for categories no longer configured survive.
    pub category: String,
    pub label: Label,
}

/// Errors raised while reading or writing the label stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read label store {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("Label store {path} has no {column:?} column")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("Invalid label in {path} on line {line}: {reason}")]
    InvalidLabel {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("Failed to write label store {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Comment {0} is not part of the loaded corpus")]
    UnknownComment(CommentId),
}

impl StoreError {
    /// True for failures that happened while reading an existing store.
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            StoreError::Read { .. }
                | StoreError::MissingColumn { .. }
                | StoreError::InvalidLabel { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_integer_and_float_spellings() {
        assert_eq!("1".parse::<Label>().unwrap(), Label::True);
        assert_eq!(" 0.0 ".parse::<Label>().unwrap(), Label::False);
        assert!("yes".parse::<Label>().is_err());
        assert_eq!(Label::from(true).as_str(), "1");
    }
}
