//! Reaction repository contract and SQLite implementation.
//!
//! # Invariants
//! - At most one row per (article, user, kind); the storage index is the
//!   source of truth and repeated inserts are absorbed with
//!   `ON CONFLICT DO NOTHING`.
//! - Counts and per-user state never include rows for soft-deleted articles;
//!   callers gate on `article_is_active` before reading.

use crate::model::article::ArticleId;
use crate::model::reaction::{Reaction, ReactionKind, ReactionCounts, UserReactionState};
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection};
use uuid::Uuid;

/// Repository interface for the reaction ledger.
pub trait ReactionRepository {
    /// Inserts a reaction row. Returns `false` when the triple already
    /// existed and nothing was written.
    fn insert_reaction(
        &self,
        uuid: Uuid,
        article_id: ArticleId,
        user_id: UserId,
        kind: ReactionKind,
    ) -> RepoResult<bool>;
    fn get_reaction(
        &self,
        article_id: ArticleId,
        user_id: UserId,
        kind: ReactionKind,
    ) -> RepoResult<Option<Reaction>>;
    /// Deletes a reaction row. Returns `false` when no row matched.
    fn delete_reaction(
        &self,
        article_id: ArticleId,
        user_id: UserId,
        kind: ReactionKind,
    ) -> RepoResult<bool>;
    /// Per-kind totals for one article.
    fn counts_for(&self, article_id: ArticleId) -> RepoResult<ReactionCounts>;
    /// Which kinds one user has placed on one article.
    fn user_state(&self, article_id: ArticleId, user_id: UserId) -> RepoResult<UserReactionState>;
    /// Whether the target article exists and is not soft-deleted.
    fn article_is_active(&self, article_id: ArticleId) -> RepoResult<bool>;
}

/// SQLite-backed reaction repository.
pub struct SqliteReactionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReactionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReactionRepository for SqliteReactionRepository<'_> {
    fn insert_reaction(
        &self,
        uuid: Uuid,
        article_id: ArticleId,
        user_id: UserId,
        kind: ReactionKind,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT INTO reactions (uuid, article_uuid, user_uuid, kind)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (article_uuid, user_uuid, kind) DO NOTHING;",
            params![
                uuid.to_string(),
                article_id.to_string(),
                user_id.to_string(),
                kind.as_str(),
            ],
        )?;

        Ok(changed == 1)
    }

    fn get_reaction(
        &self,
        article_id: ArticleId,
        user_id: UserId,
        kind: ReactionKind,
    ) -> RepoResult<Option<Reaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, created_at
             FROM reactions
             WHERE article_uuid = ?1
               AND user_uuid = ?2
               AND kind = ?3;",
        )?;

        let mut rows = stmt.query(params![
            article_id.to_string(),
            user_id.to_string(),
            kind.as_str()
        ])?;
        if let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            return Ok(Some(Reaction {
                uuid: parse_uuid(&uuid_text, "reactions.uuid")?,
                article_id,
                user_id,
                kind,
                created_at: row.get("created_at")?,
            }));
        }

        Ok(None)
    }

    fn delete_reaction(
        &self,
        article_id: ArticleId,
        user_id: UserId,
        kind: ReactionKind,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM reactions
             WHERE article_uuid = ?1
               AND user_uuid = ?2
               AND kind = ?3;",
            params![
                article_id.to_string(),
                user_id.to_string(),
                kind.as_str()
            ],
        )?;

        Ok(changed == 1)
    }

    fn counts_for(&self, article_id: ArticleId) -> RepoResult<ReactionCounts> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*) AS total
             FROM reactions
             WHERE article_uuid = ?1
             GROUP BY kind;",
        )?;

        let mut rows = stmt.query([article_id.to_string()])?;
        let mut counts = ReactionCounts::default();
        while let Some(row) = rows.next()? {
            let kind_text: String = row.get("kind")?;
            let kind = ReactionKind::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid kind `{kind_text}` in reactions.kind"))
            })?;
            counts.set(kind, row.get("total")?);
        }

        Ok(counts)
    }

    fn user_state(&self, article_id: ArticleId, user_id: UserId) -> RepoResult<UserReactionState> {
        let mut stmt = self.conn.prepare(
            "SELECT kind
             FROM reactions
             WHERE article_uuid = ?1
               AND user_uuid = ?2;",
        )?;

        let mut rows = stmt.query(params![article_id.to_string(), user_id.to_string()])?;
        let mut state = UserReactionState::default();
        while let Some(row) = rows.next()? {
            let kind_text: String = row.get("kind")?;
            let kind = ReactionKind::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid kind `{kind_text}` in reactions.kind"))
            })?;
            state.mark(kind);
        }

        Ok(state)
    }

    fn article_is_active(&self, article_id: ArticleId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM articles
                WHERE uuid = ?1
                  AND is_deleted = 0
            );",
            [article_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}
