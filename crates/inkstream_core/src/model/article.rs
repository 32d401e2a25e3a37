//! Article domain model.
//!
//! # Invariants
//! - `slug` is unique among active (non-deleted) articles.
//! - `view_count` is monotonically non-decreasing.
//! - `is_deleted` is the source of truth for tombstone state; soft-deleted
//!   articles are excluded from default queries but keep their row.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an article.
pub type ArticleId = Uuid;

/// Publication lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

impl ArticleStatus {
    /// Stable string id used in storage and request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    /// Parses a storage/request value. Unknown values are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Canonical article record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub uuid: ArticleId,
    pub title: String,
    /// Markdown body.
    pub body: String,
    pub summary: Option<String>,
    /// Reference into the external asset store, if a cover image exists.
    pub image_ref: Option<String>,
    pub status: ArticleStatus,
    /// URL-safe unique identifier derived from the title.
    pub slug: String,
    pub view_count: u32,
    pub created_by: UserId,
    /// Soft delete tombstone.
    pub is_deleted: bool,
}

impl Article {
    /// Creates a new published article with a generated stable ID.
    ///
    /// The slug is supplied by the caller because deriving it requires
    /// knowledge of already-stored slugs.
    pub fn new(
        created_by: UserId,
        title: impl Into<String>,
        body: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            summary: None,
            image_ref: None,
            status: ArticleStatus::Published,
            slug: slug.into(),
            view_count: 0,
            created_by,
            is_deleted: false,
        }
    }
}
