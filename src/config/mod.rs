//! Static configuration: file locations and the category list.
//!
//! Config keys (TOML): `comments_path`, `long_store_path`, `wide_store_path`,
//! `categories`, `default_target_true`, `embed_generated_ids`.

use std::num::NonZeroU32;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs::AppDirError;
use crate::labels::{CategoryError, CategorySet, DEFAULT_CATEGORIES};

mod io;

pub use io::{CONFIG_FILE_NAME, config_path, load_from, load_or_default, save_to_path};

/// Labeler settings. Relative paths resolve against the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelerConfig {
    #[serde(default = "default_comments_path")]
    pub comments_path: PathBuf,
    #[serde(default = "default_long_store_path")]
    pub long_store_path: PathBuf,
    #[serde(default = "default_wide_store_path")]
    pub wide_store_path: PathBuf,
    /// Ordered category list; drives wide-store columns and summary rows.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Goal pre-filled on the setup screen.
    #[serde(default = "default_target_true")]
    pub default_target_true: u32,
    /// Write synthesized comment ids back into the comments file so labels
    /// stay attached to their comments across launches.
    #[serde(default)]
    pub embed_generated_ids: bool,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            comments_path: default_comments_path(),
            long_store_path: default_long_store_path(),
            wide_store_path: default_wide_store_path(),
            categories: default_categories(),
            default_target_true: default_target_true(),
            embed_generated_ids: false,
        }
    }
}

impl LabelerConfig {
    /// Validated category set.
    pub fn category_set(&self) -> Result<CategorySet, ConfigError> {
        Ok(CategorySet::new(self.categories.iter().cloned())?)
    }

    /// Setup-screen goal, never below one.
    pub fn default_target(&self) -> NonZeroU32 {
        NonZeroU32::new(self.default_target_true).unwrap_or(NonZeroU32::MIN)
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.default_target_true = self.default_target_true.max(1);
        self
    }
}

fn default_comments_path() -> PathBuf {
    PathBuf::from("data/comments.csv")
}

fn default_long_store_path() -> PathBuf {
    PathBuf::from("data/labels.csv")
}

fn default_wide_store_path() -> PathBuf {
    PathBuf::from("data/labels_wide.csv")
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|name| name.to_string()).collect()
}

fn default_target_true() -> u32 {
    10
}

/// Errors raised while loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration directory available: {0}")]
    Dir(#[from] AppDirError),
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config for {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid category list: {0}")]
    Categories(#[from] CategoryError),
}
