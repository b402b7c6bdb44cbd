//! Long-format label store: the source of truth for every saved label.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{Category, CategorySet, LabelRecord, LabelsMap, StoreError, WideStore};
use crate::corpus::{CommentId, CommentStore, ID_COLUMN, TEXT_COLUMN};
use crate::csv_io::{self, HeaderIndex};

pub const CATEGORY_COLUMN: &str = "category";
pub const LABEL_COLUMN: &str = "label";

/// Result of a successful persist.
#[derive(Debug)]
pub struct PersistOutcome {
    /// Full record set now on disk, in file order.
    pub records: Vec<LabelRecord>,
    /// Set when the long store was written but the wide rebuild failed.
    /// The long store stays authoritative; the wide file catches up on the
    /// next successful persist.
    pub wide_error: Option<StoreError>,
}

/// File-backed long store paired with the wide store it feeds.
#[derive(Debug, Clone)]
pub struct LongStore {
    path: PathBuf,
    wide: WideStore,
    categories: CategorySet,
}

impl LongStore {
    pub fn new(path: impl Into<PathBuf>, wide: WideStore, categories: CategorySet) -> Self {
        Self {
            path: path.into(),
            wide,
            categories,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn wide(&self) -> &WideStore {
        &self.wide
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Every record ever saved. A missing file is an empty store.
    pub fn load_persisted(&self) -> Result<Vec<LabelRecord>, StoreError> {
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
        let category_col = self.require(&headers, CATEGORY_COLUMN)?;
        let label_col = self.require(&headers, LABEL_COLUMN)?;

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            let label = csv_io::cell(&record, label_col).parse().map_err(|reason| {
                StoreError::InvalidLabel {
                    path: self.path.clone(),
                    line: record.position().map_or(0, |pos| pos.line()),
                    reason,
                }
            })?;
            records.push(LabelRecord {
                comment_id: CommentId::from_string(csv_io::cell(&record, id_col)),
                comment_text: csv_io::cell(&record, text_col).to_string(),
                category: csv_io::cell(&record, category_col).to_string(),
                label,
            });
        }
        Ok(records)
    }

    /// Replace every record of `category` with the contents of `labels`.
    ///
    /// `labels` must hold the cumulative labels for the category: anything
    /// saved earlier for it and absent from the map is dropped. Records of
    /// other categories are carried over untouched. Ids missing from the
    /// corpus keep the text they were saved with. A store that cannot be
    /// read aborts the persist instead of being overwritten.
    pub fn persist(
        &self,
        category: &Category,
        labels: &LabelsMap,
        comments: &CommentStore,
    ) -> Result<PersistOutcome, StoreError> {
        let (previous, mut records): (Vec<LabelRecord>, Vec<LabelRecord>) = self
            .load_persisted()?
            .into_iter()
            .partition(|record| record.category == category.as_str());
        let saved_text: HashMap<&CommentId, &str> = previous
            .iter()
            .map(|record| (&record.comment_id, record.comment_text.as_str()))
            .collect();
        let retained = records.len();
        for (comment_id, label) in labels {
            let comment_text = comments
                .text_for(comment_id)
                .or_else(|| saved_text.get(comment_id).copied())
                .ok_or_else(|| StoreError::UnknownComment(comment_id.clone()))?;
            records.push(LabelRecord {
                comment_id: comment_id.clone(),
                comment_text: comment_text.to_string(),
                category: category.as_str().to_string(),
                label: *label,
            });
        }

        self.write_all(&records)?;
        tracing::info!(
            "Saved {} {category} labels ({} from other categories) to {}",
            records.len() - retained,
            retained,
            self.path.display()
        );

        let wide_error = match self.wide.rebuild(&records, &self.categories) {
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("Wide store is stale until the next save: {err}");
                Some(err)
            }
        };
        Ok(PersistOutcome {
            records,
            wide_error,
        })
    }

    fn write_all(&self, records: &[LabelRecord]) -> Result<(), StoreError> {
        csv_io::replace_atomically(&self.path, |writer| {
            writer.write_record([ID_COLUMN, TEXT_COLUMN, CATEGORY_COLUMN, LABEL_COLUMN])?;
            for record in records {
                writer.write_record([
                    record.comment_id.as_str(),
                    record.comment_text.as_str(),
                    record.category.as_str(),
                    record.label.as_str(),
                ])?;
            }
            Ok(())
        })
        .map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn require(&self, headers: &HeaderIndex, column: &'static str) -> Result<usize, StoreError> {
        headers.find(column).ok_or_else(|| StoreError::MissingColumn {
            path: self.path.clone(),
            column,
        })
    }
}
