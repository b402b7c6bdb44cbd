//! Comment corpus loading and identity.
//!
//! The corpus is read once per launch. Rows without a `comment_id` receive a
//! random UUID that lives for the process unless written back with
//! [`CommentStore::embed_generated_ids`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::csv_io::{self, HeaderIndex};

/// Header of the required comment text column.
pub const TEXT_COLUMN: &str = "comment_text";
/// Header of the optional identifier column.
pub const ID_COLUMN: &str = "comment_id";

/// Stable identifier for a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommentId(String);

impl CommentId {
    /// Create a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Rehydrate an identifier from a stored string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single immutable comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
}

impl Comment {
    pub fn new(id: CommentId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// The corpus could not be used. Labeling is impossible without it.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Comments file {0} does not exist")]
    Missing(PathBuf),
    #[error("Failed to read comments from {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("Comments file {path} has no {column:?} column")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("Comment id {id} appears more than once in {path}")]
    DuplicateId { path: PathBuf, id: CommentId },
    #[error("Comments file {0} changed since it was loaded")]
    Changed(PathBuf),
    #[error("Failed to write comment ids back to {path}: {source}")]
    WriteBack {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// In-memory corpus in source order, with an id lookup.
#[derive(Debug, Clone, Default)]
pub struct CommentStore {
    comments: Vec<Comment>,
    lookup: HashMap<CommentId, usize>,
    generated_ids: usize,
}

impl CommentStore {
    /// Read the full corpus from a CSV file.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let read_err = |source: csv::Error| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv_io::open_reader(path)
            .map_err(|err| read_err(err.into()))?
            .ok_or_else(|| CorpusError::Missing(path.to_path_buf()))?;
        let headers = HeaderIndex::new(reader.headers().map_err(read_err)?);
        let text_col = headers
            .find(TEXT_COLUMN)
            .ok_or_else(|| CorpusError::MissingColumn {
                path: path.to_path_buf(),
                column: TEXT_COLUMN,
            })?;
        let id_col = headers.find(ID_COLUMN);

        let mut store = Self::default();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            let embedded = id_col
                .map(|col| csv_io::cell(&record, col).trim())
                .filter(|id| !id.is_empty());
            let id = match embedded {
                Some(id) => CommentId::from_string(id),
                None => {
                    store.generated_ids += 1;
                    CommentId::generate()
                }
            };
            let text = csv_io::cell(&record, text_col).to_string();
            store
                .push(Comment::new(id, text))
                .map_err(|id| CorpusError::DuplicateId {
                    path: path.to_path_buf(),
                    id,
                })?;
        }
        tracing::info!(
            "Loaded {} comments from {} ({} generated ids)",
            store.len(),
            path.display(),
            store.generated_ids
        );
        Ok(store)
    }

    /// Build a store from already-identified comments.
    ///
    /// Returns the first duplicate id as the error.
    pub fn from_comments(comments: impl IntoIterator<Item = Comment>) -> Result<Self, CommentId> {
        let mut store = Self::default();
        for comment in comments {
            store.push(comment)?;
        }
        Ok(store)
    }

    fn push(&mut self, comment: Comment) -> Result<(), CommentId> {
        if self.lookup.contains_key(&comment.id) {
            return Err(comment.id);
        }
        self.lookup.insert(comment.id.clone(), self.comments.len());
        self.comments.push(comment);
        Ok(())
    }

    /// Rewrite the source file with a `comment_id` column so generated ids
    /// survive the next launch. Other columns are kept as they are. No-op when
    /// every id came from the file.
    pub fn embed_generated_ids(&mut self, path: &Path) -> Result<bool, CorpusError> {
        if self.generated_ids == 0 {
            return Ok(false);
        }
        let read_err = |source: csv::Error| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv_io::open_reader(path)
            .map_err(|err| read_err(err.into()))?
            .ok_or_else(|| CorpusError::Missing(path.to_path_buf()))?;
        let headers = reader.headers().map_err(read_err)?.clone();
        let id_col = HeaderIndex::new(&headers).find(ID_COLUMN);
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;
        if rows.len() != self.comments.len() {
            return Err(CorpusError::Changed(path.to_path_buf()));
        }

        csv_io::replace_atomically(path, |writer| {
            match id_col {
                Some(_) => writer.write_record(&headers)?,
                None => writer.write_record(std::iter::once(ID_COLUMN).chain(headers.iter()))?,
            }
            for (row, comment) in rows.iter().zip(&self.comments) {
                let id = comment.id.as_str();
                match id_col {
                    Some(col) => writer.write_record(
                        row.iter()
                            .enumerate()
                            .map(|(index, value)| if index == col { id } else { value }),
                    )?,
                    None => writer.write_record(std::iter::once(id).chain(row.iter()))?,
                }
            }
            Ok(())
        })
        .map_err(|source| CorpusError::WriteBack {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            "Embedded {} generated comment ids into {}",
            self.generated_ids,
            path.display()
        );
        self.generated_ids = 0;
        Ok(true)
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.lookup.contains_key(id)
    }

    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.lookup.get(id).map(|&index| &self.comments[index])
    }

    /// Text of a comment by id.
    pub fn text_for(&self, id: &CommentId) -> Option<&str> {
        self.get(id).map(|comment| comment.text.as_str())
    }

    /// Number of ids synthesized during load and not yet written back.
    pub fn generated_ids(&self) -> usize {
        self.generated_ids
    }
}
