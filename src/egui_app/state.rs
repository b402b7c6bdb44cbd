//! UI-local state that never reaches the labeling core.

use std::num::NonZeroU32;

/// Top-level page picked in the navigation panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Labeling,
    Summary,
}

/// Values being edited on the setup screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupForm {
    pub category_index: usize,
    pub target_true: u32,
}

impl SetupForm {
    pub fn new(default_target: NonZeroU32) -> Self {
        Self {
            category_index: 0,
            target_true: default_target.get(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct UiState {
    pub page: Page,
    pub setup: SetupForm,
}

impl UiState {
    pub fn new(default_target: NonZeroU32) -> Self {
        Self {
            page: Page::default(),
            setup: SetupForm::new(default_target),
        }
    }
}
