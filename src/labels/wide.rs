//! Wide projection: one row per labeled comment, one column per category.
//!
//! The wide file is never edited in place. Every rebuild discards it and
//! writes it again from the long records, so it may lag behind the long store
//! after a failed rebuild but never disagrees with it once rebuilt.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{CategorySet, Label, LabelRecord, StoreError};
use crate::corpus::{CommentId, ID_COLUMN, TEXT_COLUMN};
use crate::csv_io::{self, HeaderIndex};

/// Denormalized row of the wide store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideRow {
    pub comment_id: CommentId,
    pub comment_text: String,
    /// One cell per configured category, in configured order.
    pub cells: Vec<Option<Label>>,
}

impl WideRow {
    /// Cell for a category name, `None` when unlabeled or not configured.
    pub fn cell(&self, categories: &CategorySet, name: &str) -> Option<Label> {
        categories
            .position(name)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }
}

/// Pivot long records into wide rows sorted by `(comment_id, comment_text)`.
///
/// The first record wins when a pair appears twice. Records for categories
/// outside `categories` still produce a row, just without a filled cell.
pub fn project(records: &[LabelRecord], categories: &CategorySet) -> Vec<WideRow> {
    let mut grouped: BTreeMap<(&CommentId, &str), Vec<Option<Label>>> = BTreeMap::new();
    for record in records {
        let cells = grouped
            .entry((&record.comment_id, record.comment_text.as_str()))
            .or_insert_with(|| vec![None; categories.len()]);
        if let Some(index) = categories.position(&record.category)
            && cells[index].is_none()
        {
            cells[index] = Some(record.label);
        }
    }
    grouped
        .into_iter()
        .map(|((comment_id, comment_text), cells)| WideRow {
            comment_id: comment_id.clone(),
            comment_text: comment_text.to_string(),
            cells,
        })
        .collect()
}

/// File-backed wide store.
#[derive(Debug, Clone)]
pub struct WideStore {
    path: PathBuf,
}

impl WideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the wide file with a fresh projection of `records`.
    pub fn rebuild(
        &self,
        records: &[LabelRecord],
        categories: &CategorySet,
    ) -> Result<usize, StoreError> {
        let rows = project(records, categories);
        csv_io::replace_atomically(&self.path, |writer| {
            writer.write_record(
                [ID_COLUMN, TEXT_COLUMN]
                    .into_iter()
                    .chain(categories.iter().map(|category| category.as_str())),
            )?;
            for row in &rows {
                writer.write_record(
                    [row.comment_id.as_str(), row.comment_text.as_str()]
                        .into_iter()
                        .chain(row.cells.iter().map(|cell| cell.map_or("", Label::as_str))),
                )?;
            }
            Ok(())
        })
        .map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!("Rebuilt {} with {} rows", self.path.display(), rows.len());
        Ok(rows.len())
    }

    /// Read the wide file back. A missing file reads as empty; a missing
    /// category column reads as all-empty cells.
    pub fn load(&self, categories: &CategorySet) -> Result<Vec<WideRow>, StoreError> {
        let read_err = |source: csv::Error| StoreError::Read {
            path: self.path.clone(),
            source,
        };
        let opened = csv_io::open_reader(&self.path).map_err(|err| read_err(err.into()))?;
        let Some(mut reader) = opened else {
            return Ok(Vec::new());
        };
        let headers = HeaderIndex::new(reader.headers().map_err(read_err)?);
        let id_col = self.require(&headers, ID_COLUMN)?;
        let text_col = self.require(&headers, TEXT_COLUMN)?;
        let category_cols: Vec<Option<usize>> = categories
            .iter()
            .map(|category| headers.find(category.as_str()))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            let line = record.position().map_or(0, |pos| pos.line());
            let mut cells = Vec::with_capacity(category_cols.len());
            for col in &category_cols {
                let value = col.map_or("", |col| csv_io::cell(&record, col)).trim();
                let cell = if value.is_empty() {
                    None
                } else {
                    Some(value.parse::<Label>().map_err(|reason| {
                        StoreError::InvalidLabel {
                            path: self.path.clone(),
                            line,
                            reason,
                        }
                    })?)
                };
                cells.push(cell);
            }
            rows.push(WideRow {
                comment_id: CommentId::from_string(csv_io::cell(&record, id_col)),
                comment_text: csv_io::cell(&record, text_col).to_string(),
                cells,
            });
        }
        Ok(rows)
    }

    fn require(&self, headers: &HeaderIndex, column: &'static str) -> Result<usize, StoreError> {
        headers.find(column).ok_or_else(|| StoreError::MissingColumn {
            path: self.path.clone(),
            column,
        })
    }
}
