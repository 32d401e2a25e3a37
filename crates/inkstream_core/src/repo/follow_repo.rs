//! Follow-graph repository contract and SQLite implementation.
//!
//! # Invariants
//! - One row per (follower, followed) pair, enforced by the composite
//!   primary key; repeated follows are absorbed with
//!   `ON CONFLICT DO NOTHING` so the self-follow CHECK still fires.
//! - Listings skip soft-deleted accounts and preserve insertion order.

use crate::model::follow::FollowEdge;
use crate::model::user::{UserId, UserSummary};
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection, Statement};

/// Repository interface for the follower graph.
pub trait FollowRepository {
    /// Records a follow edge. Returns `false` when the edge already existed.
    fn insert_edge(&self, follower: UserId, followed: UserId) -> RepoResult<bool>;
    /// Removes a follow edge. Returns `false` when no edge matched.
    fn delete_edge(&self, follower: UserId, followed: UserId) -> RepoResult<bool>;
    fn get_edge(&self, follower: UserId, followed: UserId) -> RepoResult<Option<FollowEdge>>;
    /// Active accounts following `user`, oldest follow first.
    fn list_followers(&self, user: UserId) -> RepoResult<Vec<UserSummary>>;
    /// Active accounts `user` follows, oldest follow first.
    fn list_following(&self, user: UserId) -> RepoResult<Vec<UserSummary>>;
    /// Whether the user exists and is not soft-deleted.
    fn user_is_active(&self, user: UserId) -> RepoResult<bool>;
}

/// SQLite-backed follow repository.
pub struct SqliteFollowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFollowRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FollowRepository for SqliteFollowRepository<'_> {
    fn insert_edge(&self, follower: UserId, followed: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT INTO follows (follower_uuid, followed_uuid)
             VALUES (?1, ?2)
             ON CONFLICT (follower_uuid, followed_uuid) DO NOTHING;",
            params![follower.to_string(), followed.to_string()],
        )?;

        Ok(changed == 1)
    }

    fn delete_edge(&self, follower: UserId, followed: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM follows
             WHERE follower_uuid = ?1
               AND followed_uuid = ?2;",
            params![follower.to_string(), followed.to_string()],
        )?;

        Ok(changed == 1)
    }

    fn get_edge(&self, follower: UserId, followed: UserId) -> RepoResult<Option<FollowEdge>> {
        let mut stmt = self.conn.prepare(
            "SELECT created_at
             FROM follows
             WHERE follower_uuid = ?1
               AND followed_uuid = ?2;",
        )?;

        let mut rows = stmt.query(params![follower.to_string(), followed.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(FollowEdge {
                follower_id: follower,
                followed_id: followed,
                created_at: row.get("created_at")?,
            }));
        }

        Ok(None)
    }

    fn list_followers(&self, user: UserId) -> RepoResult<Vec<UserSummary>> {
        let stmt = self.conn.prepare(
            "SELECT u.uuid, u.name, u.handle, u.avatar_ref
             FROM follows f
             INNER JOIN users u ON u.uuid = f.follower_uuid
             WHERE f.followed_uuid = ?1
               AND u.is_deleted = 0
             ORDER BY f.created_at ASC, f.rowid ASC;",
        )?;

        collect_summaries(stmt, user)
    }

    fn list_following(&self, user: UserId) -> RepoResult<Vec<UserSummary>> {
        let stmt = self.conn.prepare(
            "SELECT u.uuid, u.name, u.handle, u.avatar_ref
             FROM follows f
             INNER JOIN users u ON u.uuid = f.followed_uuid
             WHERE f.follower_uuid = ?1
               AND u.is_deleted = 0
             ORDER BY f.created_at ASC, f.rowid ASC;",
        )?;

        collect_summaries(stmt, user)
    }

    fn user_is_active(&self, user: UserId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM users
                WHERE uuid = ?1
                  AND is_deleted = 0
            );",
            [user.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn collect_summaries(mut stmt: Statement<'_>, user: UserId) -> RepoResult<Vec<UserSummary>> {
    let mut rows = stmt.query([user.to_string()])?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        summaries.push(UserSummary {
            uuid: parse_uuid(&uuid_text, "users.uuid")?,
            name: row.get("name")?,
            handle: row.get("handle")?,
            avatar_ref: row.get("avatar_ref")?,
        });
    }

    Ok(summaries)
}
