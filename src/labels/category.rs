//! Configured labeling categories and their validation.

use std::fmt;

use thiserror::Error;

/// Category names used when no configuration overrides them.
pub const DEFAULT_CATEGORIES: [&str; 4] =
    ["Safety", "Punctuality", "Cleanliness", "Driver Attitude"];

/// Column names a category may not shadow in the wide store or summary.
const RESERVED_NAMES: [&str; 3] = ["comment_id", "comment_text", "Total"];

/// A labeling category drawn from the configured [`CategorySet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    /// Borrow the category name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons a category list is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("At least one category must be configured")]
    Empty,
    #[error("Category names must not be blank")]
    Blank,
    #[error("Category {0:?} is listed more than once")]
    Duplicate(String),
    #[error("Category {0:?} collides with a reserved column name")]
    Reserved(String),
}

/// Ordered, closed set of categories. The order drives wide-store columns and
/// summary rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<Category>,
}

impl CategorySet {
    /// Validate and build a set from configured names.
    pub fn new<I, S>(names: I) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories: Vec<Category> = Vec::new();
        for name in names {
            let name = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(CategoryError::Blank);
            }
            if RESERVED_NAMES.contains(&trimmed) {
                return Err(CategoryError::Reserved(trimmed.to_string()));
            }
            if categories.iter().any(|existing| existing.as_str() == trimmed) {
                return Err(CategoryError::Duplicate(trimmed.to_string()));
            }
            categories.push(Category(trimmed.to_string()));
        }
        if categories.is_empty() {
            return Err(CategoryError::Empty);
        }
        Ok(Self { categories })
    }

    /// Look up a configured category by name.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Column position of a category name, if it is configured.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|category| category.as_str() == name)
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|name| Category((*name).to_string()))
                .collect(),
        }
    }
}
