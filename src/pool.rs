//! Selection of the comments still waiting for a label in one category.

use std::collections::HashSet;

use crate::corpus::{Comment, CommentId};
use crate::labels::{Category, LabelRecord, LabelsMap};

/// Comments not yet labeled for `category`, in corpus order.
///
/// A comment is done when the store holds a record for it in this category or
/// the running session has labeled it. An empty result means the category is
/// exhausted.
pub fn current_pool<'a>(
    all_comments: &'a [Comment],
    persisted: &[LabelRecord],
    category: &Category,
    session_labels: &LabelsMap,
) -> Vec<&'a Comment> {
    let done: HashSet<&CommentId> = persisted
        .iter()
        .filter(|record| record.category == category.as_str())
        .map(|record| &record.comment_id)
        .chain(session_labels.keys())
        .collect();
    all_comments
        .iter()
        .filter(|comment| !done.contains(&comment.id))
        .collect()
}

/// Clamp a cursor into `0..pool_size`. An empty pool clamps to 0; callers
/// must check for emptiness before indexing.
pub fn clamp_index(index: usize, pool_size: usize) -> usize {
    index.min(pool_size.saturating_sub(1))
}

/// Move a cursor by `delta`, staying inside the pool.
pub fn bump_index(index: usize, delta: isize, pool_size: usize) -> usize {
    clamp_index(index.saturating_add_signed(delta), pool_size)
}
