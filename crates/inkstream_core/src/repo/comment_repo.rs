//! Comment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the comment arena (flat rows linked by `parent_uuid`).
//! - Produce the two-level thread listing: paginated approved roots,
//!   newest first, each carrying its direct replies oldest first.
//!
//! # Invariants
//! - A reply row always stores the same `article_uuid` as its parent;
//!   the service constructs replies from the loaded parent to guarantee it.
//! - Deeper descendants are stored but never expanded by the listing.

use crate::model::article::ArticleId;
use crate::model::comment::{Comment, CommentId, CommentStatus};
use crate::model::user::UserSummary;
use crate::repo::{
    bool_to_int, normalize_page, normalize_page_size, parse_flag, parse_uuid, Page, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const COMMENTS_DEFAULT_PAGE_SIZE: u32 = 15;
const COMMENTS_PAGE_SIZE_MAX: u32 = 50;

const COMMENT_RECORD_SELECT_SQL: &str = "SELECT
    c.uuid AS uuid,
    c.article_uuid AS article_uuid,
    c.author_uuid AS author_uuid,
    c.parent_uuid AS parent_uuid,
    c.content AS content,
    c.status AS status,
    c.is_deleted AS is_deleted,
    c.created_at AS created_at,
    c.updated_at AS updated_at,
    u.name AS author_name,
    u.handle AS author_handle,
    u.avatar_ref AS author_avatar_ref
 FROM comments c
 INNER JOIN users u ON u.uuid = c.author_uuid";

/// Comment read model with its author projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub comment: Comment,
    pub author: UserSummary,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// One root comment plus its direct replies, oldest reply first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentThreadEntry {
    pub root: CommentRecord,
    pub replies: Vec<CommentRecord>,
}

/// Repository interface for threaded comments.
pub trait CommentRepository {
    fn create_comment(&self, comment: &Comment) -> RepoResult<CommentId>;
    fn get_comment(&self, id: CommentId, include_deleted: bool) -> RepoResult<Option<Comment>>;
    fn get_record(&self, id: CommentId) -> RepoResult<Option<CommentRecord>>;
    fn update_content(&self, id: CommentId, content: &str) -> RepoResult<()>;
    fn soft_delete_comment(&self, id: CommentId) -> RepoResult<()>;
    /// Approved root comments for an article, newest first, each with its
    /// direct replies oldest first.
    fn list_roots(
        &self,
        article_id: ArticleId,
        page: u32,
        page_size: Option<u32>,
    ) -> RepoResult<Page<CommentThreadEntry>>;
    /// Whether the target article exists and is not soft-deleted.
    fn article_is_active(&self, article_id: ArticleId) -> RepoResult<bool>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(&self, comment: &Comment) -> RepoResult<CommentId> {
        self.conn.execute(
            "INSERT INTO comments (
                uuid,
                article_uuid,
                author_uuid,
                parent_uuid,
                content,
                status,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                comment.uuid.to_string(),
                comment.article_id.to_string(),
                comment.author_id.to_string(),
                comment.parent_id.map(|id| id.to_string()),
                comment.content.as_str(),
                comment.status.as_str(),
                bool_to_int(comment.is_deleted),
            ],
        )?;

        Ok(comment.uuid)
    }

    fn get_comment(&self, id: CommentId, include_deleted: bool) -> RepoResult<Option<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                uuid,
                article_uuid,
                author_uuid,
                parent_uuid,
                content,
                status,
                is_deleted
             FROM comments
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);",
        )?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_fields(row)?));
        }

        Ok(None)
    }

    fn get_record(&self, id: CommentId) -> RepoResult<Option<CommentRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_RECORD_SELECT_SQL}
             WHERE c.uuid = ?1
               AND c.is_deleted = 0;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_record(row)?));
        }

        Ok(None)
    }

    fn update_content(&self, id: CommentId, content: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE comments
             SET
                content = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![id.to_string(), content],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("comment", id));
        }

        Ok(())
    }

    fn soft_delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE comments
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("comment", id));
        }

        Ok(())
    }

    fn list_roots(
        &self,
        article_id: ArticleId,
        page: u32,
        page_size: Option<u32>,
    ) -> RepoResult<Page<CommentThreadEntry>> {
        let page = normalize_page(page);
        let page_size =
            normalize_page_size(page_size, COMMENTS_DEFAULT_PAGE_SIZE, COMMENTS_PAGE_SIZE_MAX);
        let article_text = article_id.to_string();

        let total_count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM comments
             WHERE article_uuid = ?1
               AND parent_uuid IS NULL
               AND status = 'approved'
               AND is_deleted = 0;",
            [article_text.as_str()],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_RECORD_SELECT_SQL}
             WHERE c.article_uuid = ?1
               AND c.parent_uuid IS NULL
               AND c.status = 'approved'
               AND c.is_deleted = 0
             ORDER BY c.created_at DESC, c.uuid ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;

        let mut rows = stmt.query(params![
            article_text.as_str(),
            page_size,
            // Widen before multiplying: huge page numbers must not overflow.
            i64::from(page - 1) * i64::from(page_size)
        ])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let root = parse_comment_record(row)?;
            let replies = self.load_replies(root.comment.uuid)?;
            items.push(CommentThreadEntry { root, replies });
        }

        Ok(Page {
            items,
            page,
            page_size,
            total_count: total_count.max(0) as u64,
        })
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

impl SqliteCommentRepository<'_> {
    fn load_replies(&self, parent_id: CommentId) -> RepoResult<Vec<CommentRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_RECORD_SELECT_SQL}
             WHERE c.parent_uuid = ?1
               AND c.is_deleted = 0
             ORDER BY c.created_at ASC, c.uuid ASC;"
        ))?;

        let mut rows = stmt.query([parent_id.to_string()])?;
        let mut replies = Vec::new();
        while let Some(row) = rows.next()? {
            replies.push(parse_comment_record(row)?);
        }

        Ok(replies)
    }
}

fn parse_comment_fields(row: &Row<'_>) -> RepoResult<Comment> {
    let uuid_text: String = row.get("uuid")?;
    let article_text: String = row.get("article_uuid")?;
    let author_text: String = row.get("author_uuid")?;
    let status_text: String = row.get("status")?;

    let parent_id = match row.get::<_, Option<String>>("parent_uuid")? {
        Some(value) => Some(parse_uuid(&value, "comments.parent_uuid")?),
        None => None,
    };

    Ok(Comment {
        uuid: parse_uuid(&uuid_text, "comments.uuid")?,
        article_id: parse_uuid(&article_text, "comments.article_uuid")?,
        author_id: parse_uuid(&author_text, "comments.author_uuid")?,
        parent_id,
        content: row.get("content")?,
        status: CommentStatus::parse(&status_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid status `{status_text}` in comments.status"))
        })?,
        is_deleted: parse_flag(row.get("is_deleted")?, "comments.is_deleted")?,
    })
}

fn parse_comment_record(row: &Row<'_>) -> RepoResult<CommentRecord> {
    let comment = parse_comment_fields(row)?;
    let author = UserSummary {
        uuid: comment.author_id,
        name: row.get("author_name")?,
        handle: row.get("author_handle")?,
        avatar_ref: row.get("author_avatar_ref")?,
    };

    Ok(CommentRecord {
        comment,
        author,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
