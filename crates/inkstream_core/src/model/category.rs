//! Category model.
//!
//! # Invariants
//! - `name` and `slug` are unique across all categories.
//! - Categories are hard-deleted; association rows are removed with them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a category.
pub type CategoryId = Uuid;

/// Canonical category record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uuid: CategoryId,
    pub name: String,
    pub slug: String,
}

impl Category {
    /// Creates a new category with a generated stable ID.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
        }
    }
}
