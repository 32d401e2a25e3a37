//! Reaction model: per-user like/bookmark/favorite markers on articles.
//!
//! # Invariants
//! - At most one reaction per (article, user, kind); enforced by a unique
//!   index in storage, not only by application pre-checks.
//! - Reactions are hard-deleted on removal.

use crate::model::article::ArticleId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a reaction row.
pub type ReactionId = Uuid;

/// Closed set of reaction kinds.
///
/// Kept as one enumeration (rather than one table per kind) so the
/// uniqueness constraint and counting logic stay uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Bookmark,
    Favorite,
}

impl ReactionKind {
    /// All kinds, in stable order.
    pub const ALL: [Self; 3] = [Self::Like, Self::Bookmark, Self::Favorite];

    /// Stable string id used in storage and request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Bookmark => "bookmark",
            Self::Favorite => "favorite",
        }
    }

    /// Parses a storage/request value. Unknown values are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(Self::Like),
            "bookmark" => Some(Self::Bookmark),
            "favorite" => Some(Self::Favorite),
            _ => None,
        }
    }
}

/// Canonical reaction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub uuid: ReactionId,
    pub article_id: ArticleId,
    pub user_id: UserId,
    pub kind: ReactionKind,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
}

/// Per-kind aggregate counts for one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub like: u32,
    pub bookmark: u32,
    pub favorite: u32,
}

impl ReactionCounts {
    /// Returns the count for one kind.
    pub fn get(&self, kind: ReactionKind) -> u32 {
        match kind {
            ReactionKind::Like => self.like,
            ReactionKind::Bookmark => self.bookmark,
            ReactionKind::Favorite => self.favorite,
        }
    }

    fn slot(&mut self, kind: ReactionKind) -> &mut u32 {
        match kind {
            ReactionKind::Like => &mut self.like,
            ReactionKind::Bookmark => &mut self.bookmark,
            ReactionKind::Favorite => &mut self.favorite,
        }
    }

    /// Sets the count for one kind.
    pub fn set(&mut self, kind: ReactionKind, count: u32) {
        *self.slot(kind) = count;
    }
}

/// Per-user reaction flags for one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReactionState {
    pub like: bool,
    pub bookmark: bool,
    pub favorite: bool,
}

impl UserReactionState {
    /// Marks one kind as present.
    pub fn mark(&mut self, kind: ReactionKind) {
        match kind {
            ReactionKind::Like => self.like = true,
            ReactionKind::Bookmark => self.bookmark = true,
            ReactionKind::Favorite => self.favorite = true,
        }
    }
}
