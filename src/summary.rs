//! Per-category label counts for reporting.

use std::collections::HashSet;

use serde::Serialize;

use crate::corpus::{Comment, CommentId};
use crate::labels::{CategorySet, Label, LabelRecord};

/// Label of the row that sums every category.
pub const TOTAL_ROW: &str = "Total";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub category: String,
    pub true_count: usize,
    pub false_count: usize,
    pub labeled: usize,
    pub unlabeled: usize,
}

impl SummaryRow {
    fn empty(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            true_count: 0,
            false_count: 0,
            labeled: 0,
            unlabeled: 0,
        }
    }

    fn add(&mut self, other: &SummaryRow) {
        self.true_count += other.true_count;
        self.false_count += other.false_count;
        self.labeled += other.labeled;
        self.unlabeled += other.unlabeled;
    }
}

/// Summary table: one row per configured category, then the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
    pub total: SummaryRow,
    pub total_comments: usize,
    /// Records whose comment is not in the corpus; excluded from the counts.
    pub orphaned_records: usize,
}

impl Summary {
    /// Category rows followed by the total row.
    pub fn table(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().chain(std::iter::once(&self.total))
    }
}

/// Count labels per category over the persisted records.
///
/// Only records for comments in `comments` are counted, which keeps
/// `labeled + unlabeled` equal to the corpus size for every category.
pub fn summarize(
    comments: &[Comment],
    records: &[LabelRecord],
    categories: &CategorySet,
) -> Summary {
    let known: HashSet<&CommentId> = comments.iter().map(|comment| &comment.id).collect();
    let mut rows: Vec<SummaryRow> = categories
        .iter()
        .map(|category| SummaryRow::empty(category.as_str()))
        .collect();
    let mut orphaned_records = 0;
    for record in records {
        if !known.contains(&record.comment_id) {
            orphaned_records += 1;
            continue;
        }
        let Some(row) = categories
            .position(&record.category)
            .map(|index| &mut rows[index])
        else {
            continue;
        };
        match record.label {
            Label::True => row.true_count += 1,
            Label::False => row.false_count += 1,
        }
    }

    let mut total = SummaryRow::empty(TOTAL_ROW);
    for row in &mut rows {
        row.labeled = row.true_count + row.false_count;
        row.unlabeled = comments.len().saturating_sub(row.labeled);
        total.add(row);
    }
    if orphaned_records > 0 {
        tracing::warn!("{orphaned_records} saved labels refer to comments missing from the corpus");
    }
    Summary {
        rows,
        total,
        total_comments: comments.len(),
        orphaned_records,
    }
}
