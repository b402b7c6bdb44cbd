//! Library exports for the labeler binary and integration tests.
/// Application directory resolution.
pub mod app_dirs;
/// User configuration stored as TOML.
pub mod config;
/// Comment corpus loading and stable ids.
pub mod corpus;
mod csv_io;
/// egui front end.
pub mod egui_app;
/// Label values, categories and the CSV label stores.
pub mod labels;
/// Tracing setup.
pub mod logging;
/// Unlabeled comment pool for a category.
pub mod pool;
/// Labeling session state machine and controller.
pub mod session;
/// Per-category summary counts.
pub mod summary;
