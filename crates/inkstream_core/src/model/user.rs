//! User identity model.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another user.
//! - `handle` and `email` are unique across all users (enforced in storage).
//! - Deletion is a soft-delete tombstone; the row is retained for
//!   referential integrity of articles, comments and reactions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user account.
pub type UserId = Uuid;

/// Canonical user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    /// Display name.
    pub name: String,
    /// Unique short handle used in profile URLs.
    pub handle: String,
    pub email: String,
    pub bio: Option<String>,
    /// Reference into the external asset store, if an avatar was uploaded.
    pub avatar_ref: Option<String>,
    /// Soft delete tombstone.
    pub is_deleted: bool,
}

impl User {
    /// Creates a new active user with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        handle: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            handle: handle.into(),
            email: email.into(),
            bio: None,
            avatar_ref: None,
            is_deleted: false,
        }
    }
}

/// Compact author projection attached to articles and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub uuid: UserId,
    pub name: String,
    pub handle: String,
    pub avatar_ref: Option<String>,
}
