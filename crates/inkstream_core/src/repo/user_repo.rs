//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `handle` and `email` uniqueness is enforced by storage indexes;
//!   violations surface as `RepoError::Conflict`.
//! - Deletion is a tombstone update; the row stays for referential
//!   integrity of owned articles, comments and reactions.

use crate::model::user::{User, UserId, UserSummary};
use crate::repo::{bool_to_int, map_unique_violation, parse_flag, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    handle,
    email,
    bio,
    avatar_ref,
    is_deleted
FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    /// Updates name, bio and avatar for an active user.
    fn update_profile(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId, include_deleted: bool) -> RepoResult<Option<User>>;
    /// Compact projection for attaching authors to content.
    fn get_summary(&self, id: UserId) -> RepoResult<Option<UserSummary>>;
    fn soft_delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn
            .execute(
                "INSERT INTO users (uuid, name, handle, email, bio, avatar_ref, is_deleted)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    user.uuid.to_string(),
                    user.name.as_str(),
                    user.handle.as_str(),
                    user.email.as_str(),
                    user.bio.as_deref(),
                    user.avatar_ref.as_deref(),
                    bool_to_int(user.is_deleted),
                ],
            )
            .map_err(|err| map_unique_violation(err, "users.handle/email"))?;

        Ok(user.uuid)
    }

    fn update_profile(&self, user: &User) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                name = ?2,
                bio = ?3,
                avatar_ref = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![
                user.uuid.to_string(),
                user.name.as_str(),
                user.bio.as_deref(),
                user.avatar_ref.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("user", user.uuid));
        }

        Ok(())
    }

    fn get_user(&self, id: UserId, include_deleted: bool) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn get_summary(&self, id: UserId) -> RepoResult<Option<UserSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, handle, avatar_ref
             FROM users
             WHERE uuid = ?1
               AND is_deleted = 0;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            return Ok(Some(UserSummary {
                uuid: parse_uuid(&uuid_text, "users.uuid")?,
                name: row.get("name")?,
                handle: row.get("handle")?,
                avatar_ref: row.get("avatar_ref")?,
            }));
        }

        Ok(None)
    }

    fn soft_delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    Ok(User {
        uuid: parse_uuid(&uuid_text, "users.uuid")?,
        name: row.get("name")?,
        handle: row.get("handle")?,
        email: row.get("email")?,
        bio: row.get("bio")?,
        avatar_ref: row.get("avatar_ref")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "users.is_deleted")?,
    })
}
