//! Directed follow edges between users.
//!
//! # Invariants
//! - One edge per ordered (follower, followed) pair; enforced in storage.
//! - Self-follow is rejected both in the service layer and by a storage
//!   `CHECK` constraint.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// One directed follow relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower_id: UserId,
    pub followed_id: UserId,
    /// Edge creation timestamp in epoch milliseconds.
    pub created_at: i64,
}
