//! Domain model for the publishing and social-interaction core.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one record shape per aggregate, shared by all read/write paths.
//!
//! # Invariants
//! - Every aggregate is identified by a stable UUID.
//! - Deletion of users, articles and comments is represented by
//!   soft-delete tombstones, not hard delete.

pub mod article;
pub mod category;
pub mod comment;
pub mod follow;
pub mod reaction;
pub mod user;
