//! Runs the session state machine against the corpus and the label stores.
//!
//! The presentation layer sends [`Intent`]s through [`LabelingController::dispatch`]
//! and renders whatever [`LabelingController::screen`] returns afterwards.

use std::num::NonZeroU32;

use thiserror::Error;

use super::{Effect, Intent, Overlay, PoolContext, Progress, SessionState, Transition};
use crate::config::{ConfigError, LabelerConfig};
use crate::corpus::{Comment, CommentStore, CorpusError};
use crate::labels::{
    Category, CategorySet, LabelRecord, LabelsMap, LongStore, StoreError, WideStore,
};
use crate::pool;
use crate::summary::{self, Summary};

/// Reasons the labeler cannot start at all.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// Non-fatal problem to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The saved labels could not be read; the pool assumes nothing is labeled.
    StoreUnreadable(String),
    /// The last save failed. The label is still in the session and can be retried.
    SaveFailed(String),
    /// Labels were saved but the wide file could not be rebuilt.
    WideStale(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::StoreUnreadable(message)
            | Notice::SaveFailed(message)
            | Notice::WideStale(message) => message,
        }
    }
}

/// Render snapshot of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    Setup {
        categories: &'a CategorySet,
        default_target: NonZeroU32,
    },
    Labeling {
        category: &'a Category,
        comment: &'a Comment,
        index: usize,
        pool_len: usize,
        progress: Progress,
    },
    /// Every comment has a label for this category. Not dismissible.
    Exhausted {
        category: &'a Category,
        progress: Progress,
    },
    FinishModal {
        category: &'a Category,
        progress: Progress,
    },
    Congrats {
        category: &'a Category,
        target_true: NonZeroU32,
    },
}

pub struct LabelingController {
    comments: CommentStore,
    store: LongStore,
    persisted: Vec<LabelRecord>,
    state: SessionState,
    default_target: NonZeroU32,
    notice: Option<Notice>,
    unsaved: bool,
}

impl LabelingController {
    /// Load the corpus and the saved labels described by `config`.
    ///
    /// A missing or malformed corpus is fatal. An unreadable label store is
    /// not: it is reported through [`Notice::StoreUnreadable`].
    pub fn open(config: &LabelerConfig) -> Result<Self, LaunchError> {
        let categories = config.category_set()?;
        let mut comments = CommentStore::load(&config.comments_path)?;
        if config.embed_generated_ids {
            comments.embed_generated_ids(&config.comments_path)?;
        } else if comments.generated_ids() > 0 {
            tracing::warn!(
                "{} comments have no comment_id; their labels will not match after a restart",
                comments.generated_ids()
            );
        }
        let store = LongStore::new(
            config.long_store_path.clone(),
            WideStore::new(config.wide_store_path.clone()),
            categories,
        );
        Ok(Self::new(comments, store, config.default_target()))
    }

    pub fn new(comments: CommentStore, store: LongStore, default_target: NonZeroU32) -> Self {
        let mut controller = Self {
            comments,
            store,
            persisted: Vec::new(),
            state: SessionState::Setup,
            default_target,
            notice: None,
            unsaved: false,
        };
        controller.reload_persisted();
        controller
    }

    /// Re-read the long store. Read failures leave an empty label set.
    pub fn reload_persisted(&mut self) {
        match self.store.load_persisted() {
            Ok(records) => {
                tracing::info!(
                    "Loaded {} saved labels from {}",
                    records.len(),
                    self.store.path().display()
                );
                self.persisted = records;
                if matches!(self.notice, Some(Notice::StoreUnreadable(_))) {
                    self.notice = None;
                }
            }
            Err(err) => {
                tracing::warn!("Treating label store as empty: {err}");
                self.persisted = Vec::new();
                self.notice = Some(Notice::StoreUnreadable(err.to_string()));
            }
        }
    }

    /// Handle one user action to completion.
    ///
    /// Returns the save error, if any; it is also kept as a [`Notice`].
    pub fn dispatch(&mut self, intent: Intent) -> Result<(), StoreError> {
        let context = self.pool_context();
        let Transition { state, effects } = std::mem::take(&mut self.state).apply(intent, &context);
        self.state = state;
        if matches!(self.state, SessionState::Setup) {
            self.discard_unsaved();
        }

        let mut result = Ok(());
        for effect in effects {
            match effect {
                Effect::Persist { category, labels } => {
                    if let Err(err) = self.persist(&category, &labels) {
                        result = Err(err);
                    }
                }
            }
        }
        if !self.unsaved {
            // A save that succeeded under the finish modal leaves the goal
            // pending until the modal is cancelled.
            self.state = std::mem::take(&mut self.state).after_persist();
        }
        let pool_len = self.pool().len();
        self.state.clamp_cursor(pool_len);
        result
    }

    /// Save the current session labels again after a failed save.
    pub fn retry_persist(&mut self) -> Result<(), StoreError> {
        let Some(run) = self.state.run() else {
            return Ok(());
        };
        if !self.unsaved {
            return Ok(());
        }
        let (category, labels) = (run.category.clone(), run.labels.clone());
        self.persist(&category, &labels)
    }

    fn persist(&mut self, category: &Category, session: &LabelsMap) -> Result<(), StoreError> {
        let labels = self.cumulative_labels(category, session);
        match self.store.persist(category, &labels, &self.comments) {
            Ok(outcome) => {
                self.persisted = outcome.records;
                self.unsaved = false;
                self.notice = outcome
                    .wide_error
                    .map(|err| Notice::WideStale(format!("Labels saved, but {err}")));
                self.state = std::mem::take(&mut self.state).after_persist();
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to save {category} labels: {err}");
                self.unsaved = true;
                self.notice = Some(Notice::SaveFailed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Labels saved earlier for `category` overlaid with the session labels.
    ///
    /// The long store replaces a category wholesale, so earlier runs must be
    /// carried along or they would be dropped. That includes records whose
    /// comment is no longer in the corpus.
    fn cumulative_labels(&self, category: &Category, session: &LabelsMap) -> LabelsMap {
        let mut labels: LabelsMap = self
            .persisted
            .iter()
            .filter(|record| record.category == category.as_str())
            .map(|record| (record.comment_id.clone(), record.label))
            .collect();
        labels.extend(session.iter().map(|(id, label)| (id.clone(), *label)));
        labels
    }

    fn discard_unsaved(&mut self) {
        if self.unsaved {
            tracing::warn!("Returning home with unsaved labels; they were discarded");
            self.unsaved = false;
            if matches!(self.notice, Some(Notice::SaveFailed(_))) {
                self.notice = None;
            }
        }
    }

    fn pool(&self) -> Vec<&Comment> {
        match self.state.run() {
            Some(run) => pool::current_pool(
                self.comments.comments(),
                &self.persisted,
                &run.category,
                &run.labels,
            ),
            None => Vec::new(),
        }
    }

    fn pool_context(&self) -> PoolContext {
        let Some(run) = self.state.run() else {
            return PoolContext::default();
        };
        let pool = self.pool();
        PoolContext {
            pool_len: pool.len(),
            current: pool
                .get(pool::clamp_index(run.index, pool.len()))
                .map(|comment| comment.id.clone()),
        }
    }

    /// What the UI should show right now.
    pub fn screen(&self) -> Screen<'_> {
        let run = match &self.state {
            SessionState::Setup => {
                return Screen::Setup {
                    categories: self.store.categories(),
                    default_target: self.default_target,
                };
            }
            SessionState::Labeling { run, overlay } => match overlay {
                Overlay::CongratsModal => {
                    return Screen::Congrats {
                        category: &run.category,
                        target_true: run.target_true,
                    };
                }
                Overlay::FinishModal => {
                    return Screen::FinishModal {
                        category: &run.category,
                        progress: run.progress(),
                    };
                }
                Overlay::None => run,
            },
        };
        let pool = self.pool();
        if pool.is_empty() {
            return Screen::Exhausted {
                category: &run.category,
                progress: run.progress(),
            };
        }
        let index = pool::clamp_index(run.index, pool.len());
        Screen::Labeling {
            category: &run.category,
            comment: pool[index],
            index,
            pool_len: pool.len(),
            progress: run.progress(),
        }
    }

    /// Summary table over the corpus and the saved labels.
    pub fn summary(&self) -> Summary {
        summary::summarize(
            self.comments.comments(),
            &self.persisted,
            self.store.categories(),
        )
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Clear the current notice. A failed save stays reported until it is
    /// retried or the run is left.
    pub fn dismiss_notice(&mut self) {
        if self.unsaved {
            return;
        }
        self.notice = None;
    }

    /// True while the session holds labels the last save did not write.
    pub fn has_unsaved(&self) -> bool {
        self.unsaved
    }

    pub fn default_target(&self) -> NonZeroU32 {
        self.default_target
    }

    pub fn categories(&self) -> &CategorySet {
        self.store.categories()
    }

    pub fn comments(&self) -> &CommentStore {
        &self.comments
    }

    pub fn persisted(&self) -> &[LabelRecord] {
        &self.persisted
    }
}
