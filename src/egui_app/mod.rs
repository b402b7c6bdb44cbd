//! egui front end. It only renders controller snapshots and forwards user
//! intents; all labeling rules live in [`crate::session`].

pub mod state;
pub mod ui;

pub use ui::{EguiApp, MIN_VIEWPORT_SIZE};
