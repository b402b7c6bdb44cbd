//! Labeling session state machine.
//!
//! [`SessionState::apply`] is a pure transition: it takes the current state,
//! a user [`Intent`] and a snapshot of the pool, and returns the next state
//! plus the side effects the caller must run. Persisting is such an effect;
//! the goal check that follows a save lives in [`SessionState::after_persist`]
//! so it only fires once the labels are on disk.

use std::num::NonZeroU32;

use crate::corpus::CommentId;
use crate::labels::{Category, Label, LabelsMap};
use crate::pool;

pub mod controller;
mod progress;

pub use controller::{LabelingController, LaunchError, Notice, Screen};
pub use progress::Progress;

/// User actions delivered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    StartLabeling {
        category: Category,
        target_true: NonZeroU32,
    },
    /// Move the cursor; negative values go left.
    BumpIndex(isize),
    Submit(Label),
    Finish,
    CancelFinish,
    HomeFromModal,
}

/// Modal layered over an active run. At most one can be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    FinishModal,
    CongratsModal,
}

/// One labeling run: a category, a goal and the labels made so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelingRun {
    pub category: Category,
    pub target_true: NonZeroU32,
    pub index: usize,
    pub labels: LabelsMap,
}

impl LabelingRun {
    pub fn new(category: Category, target_true: NonZeroU32) -> Self {
        Self {
            category,
            target_true,
            index: 0,
            labels: LabelsMap::new(),
        }
    }

    pub fn progress(&self) -> Progress {
        Progress::from_labels(&self.labels, self.target_true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Setup,
    Labeling {
        run: LabelingRun,
        overlay: Overlay,
    },
}

/// What the state machine needs to know about the current pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolContext {
    pub pool_len: usize,
    /// Comment under the (clamped) cursor, `None` when the pool is empty.
    pub current: Option<CommentId>,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Save the cumulative session labels for `category`.
    Persist { category: Category, labels: LabelsMap },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: SessionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

impl SessionState {
    /// Apply a user intent. Intents that make no sense in the current state
    /// leave it unchanged.
    pub fn apply(self, intent: Intent, pool: &PoolContext) -> Transition {
        match (self, intent) {
            (
                SessionState::Setup,
                Intent::StartLabeling {
                    category,
                    target_true,
                },
            ) => {
                tracing::info!("Labeling {category} until {target_true} TRUE labels");
                Transition::to(SessionState::Labeling {
                    run: LabelingRun::new(category, target_true),
                    overlay: Overlay::None,
                })
            }
            (
                SessionState::Labeling {
                    mut run,
                    overlay: Overlay::None,
                },
                Intent::BumpIndex(delta),
            ) => {
                if pool.pool_len > 0 {
                    let index = pool::clamp_index(run.index, pool.pool_len);
                    run.index = pool::bump_index(index, delta, pool.pool_len);
                }
                Transition::to(SessionState::Labeling {
                    run,
                    overlay: Overlay::None,
                })
            }
            (
                SessionState::Labeling {
                    mut run,
                    overlay: Overlay::None,
                },
                Intent::Submit(label),
            ) => {
                let Some(comment_id) = pool.current.clone() else {
                    tracing::debug!("Ignoring submit with an empty pool");
                    return Transition::to(SessionState::Labeling {
                        run,
                        overlay: Overlay::None,
                    });
                };
                run.labels.insert(comment_id, label);
                let effect = Effect::Persist {
                    category: run.category.clone(),
                    labels: run.labels.clone(),
                };
                Transition {
                    state: SessionState::Labeling {
                        run,
                        overlay: Overlay::None,
                    },
                    effects: vec![effect],
                }
            }
            (
                SessionState::Labeling {
                    run,
                    overlay: Overlay::None,
                },
                Intent::Finish,
            ) => Transition::to(SessionState::Labeling {
                run,
                overlay: Overlay::FinishModal,
            }),
            (
                SessionState::Labeling {
                    run,
                    overlay: Overlay::FinishModal,
                },
                Intent::CancelFinish,
            ) => Transition::to(SessionState::Labeling {
                run,
                overlay: Overlay::None,
            }),
            (
                SessionState::Labeling {
                    run,
                    overlay: Overlay::FinishModal | Overlay::CongratsModal,
                },
                Intent::HomeFromModal,
            ) => {
                let progress = run.progress();
                tracing::info!(
                    "Closed {} run with {} TRUE and {} FALSE labels",
                    run.category,
                    progress.true_count,
                    progress.false_count
                );
                Transition::to(SessionState::Setup)
            }
            (state, intent) => {
                tracing::debug!("Ignoring {intent:?} in {}", state.describe());
                Transition::to(state)
            }
        }
    }

    /// Goal check for saved labels: reaching the TRUE target raises the
    /// congratulations overlay. Does nothing while a modal is up, so callers
    /// run it again once the overlay clears.
    pub fn after_persist(self) -> SessionState {
        match self {
            SessionState::Labeling {
                run,
                overlay: Overlay::None,
            } if run.progress().goal_reached() => {
                tracing::info!(
                    "Reached goal of {} TRUE labels for {}",
                    run.target_true,
                    run.category
                );
                SessionState::Labeling {
                    run,
                    overlay: Overlay::CongratsModal,
                }
            }
            other => other,
        }
    }

    /// Store the cursor clamped to the current pool size.
    pub fn clamp_cursor(&mut self, pool_len: usize) {
        if let SessionState::Labeling { run, .. } = self {
            run.index = pool::clamp_index(run.index, pool_len);
        }
    }

    pub fn run(&self) -> Option<&LabelingRun> {
        match self {
            SessionState::Setup => None,
            SessionState::Labeling { run, .. } => Some(run),
        }
    }

    pub fn overlay(&self) -> Option<Overlay> {
        match self {
            SessionState::Setup => None,
            SessionState::Labeling { overlay, .. } => Some(*overlay),
        }
    }

    pub fn progress(&self) -> Option<Progress> {
        self.run().map(LabelingRun::progress)
    }

    fn describe(&self) -> &'static str {
        match self.overlay() {
            None => "setup",
            Some(Overlay::None) => "labeling",
            Some(Overlay::FinishModal) => "finish modal",
            Some(Overlay::CongratsModal) => "congrats modal",
        }
    }
}
