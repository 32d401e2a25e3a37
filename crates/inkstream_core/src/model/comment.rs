//! Threaded comment model.
//!
//! # Invariants
//! - A comment belongs to exactly one article.
//! - `parent_id`, when set, references a comment on the same article.
//! - Comments form an arena keyed by id; the tree is expressed through
//!   `parent_id`, never through nested ownership.
//! - Removal is a soft-delete tombstone.

use crate::model::article::ArticleId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a comment.
pub type CommentId = Uuid;

/// Moderation state of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Pending,
    Approved,
}

impl CommentStatus {
    /// Stable string id used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }

    /// Parses a storage value. Unknown values are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

/// Canonical comment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub uuid: CommentId,
    pub article_id: ArticleId,
    pub author_id: UserId,
    /// `None` for root comments.
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub status: CommentStatus,
    /// Soft delete tombstone.
    pub is_deleted: bool,
}

impl Comment {
    /// Creates a new root comment with a generated stable ID.
    pub fn new(article_id: ArticleId, author_id: UserId, content: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            article_id,
            author_id,
            parent_id: None,
            content: content.into(),
            status: CommentStatus::Approved,
            is_deleted: false,
        }
    }

    /// Creates a reply attached to `parent`, inheriting its article.
    pub fn reply_to(parent: &Comment, author_id: UserId, content: impl Into<String>) -> Self {
        let mut comment = Self::new(parent.article_id, author_id, content);
        comment.parent_id = Some(parent.uuid);
        comment
    }

    /// Returns whether this comment is a root (non-reply) comment.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
