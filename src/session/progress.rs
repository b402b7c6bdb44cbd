//! TRUE-label goal tracking for a labeling run.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::labels::{Label, LabelsMap};

/// Progress toward the TRUE-label goal, derived from the session labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub true_count: usize,
    pub false_count: usize,
    pub target_true: u32,
}

impl Progress {
    pub fn from_labels(labels: &LabelsMap, target_true: NonZeroU32) -> Self {
        let true_count = labels.values().filter(|label| **label == Label::True).count();
        Self {
            true_count,
            false_count: labels.len() - true_count,
            target_true: target_true.get(),
        }
    }

    pub fn completed(&self) -> usize {
        self.true_count + self.false_count
    }

    /// Whole percent of the target reached, rounded down. Exceeds 100 once
    /// the goal is passed.
    pub fn percent(&self) -> usize {
        self.true_count * 100 / self.target_true.max(1) as usize
    }

    /// Fraction of the target for progress bars, capped at 1.0.
    pub fn fraction(&self) -> f32 {
        (self.true_count as f32 / self.target_true.max(1) as f32).min(1.0)
    }

    pub fn goal_reached(&self) -> bool {
        self.true_count >= self.target_true as usize
    }
}
