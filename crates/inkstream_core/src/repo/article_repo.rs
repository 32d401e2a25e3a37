//! Article repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own article persistence, category association and the composable
//!   filter/sort/paginate listing queries.
//! - Attach aggregate counts (likes/bookmarks/favorites/comments) and the
//!   author projection to every read model.
//!
//! # Invariants
//! - Slug uniqueness among active rows is enforced by a partial unique
//!   index; violations surface as `Conflict` so callers can retry.
//! - The view counter is incremented inside SQL, never read-then-written.
//! - Category attachment and article writes happen in one transaction;
//!   unknown category ids abort the whole write.

use crate::model::article::{Article, ArticleId, ArticleStatus};
use crate::model::category::{Category, CategoryId};
use crate::model::reaction::ReactionKind;
use crate::model::user::{UserId, UserSummary};
use crate::repo::{
    bool_to_int, escape_like, map_unique_violation, normalize_page, normalize_page_size,
    parse_flag, parse_uuid, Page, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};

const ARTICLES_DEFAULT_PAGE_SIZE: u32 = 10;
const ARTICLES_PAGE_SIZE_MAX: u32 = 50;

const ARTICLE_RECORD_SELECT_SQL: &str = "SELECT
    a.uuid AS uuid,
    a.title AS title,
    a.body AS body,
    a.summary AS summary,
    a.image_ref AS image_ref,
    a.status AS status,
    a.slug AS slug,
    a.view_count AS view_count,
    a.created_by AS created_by,
    a.is_deleted AS is_deleted,
    a.created_at AS created_at,
    a.updated_at AS updated_at,
    u.name AS author_name,
    u.handle AS author_handle,
    u.avatar_ref AS author_avatar_ref,
    (SELECT COUNT(*) FROM reactions r
      WHERE r.article_uuid = a.uuid AND r.kind = 'like') AS like_count,
    (SELECT COUNT(*) FROM reactions r
      WHERE r.article_uuid = a.uuid AND r.kind = 'bookmark') AS bookmark_count,
    (SELECT COUNT(*) FROM reactions r
      WHERE r.article_uuid = a.uuid AND r.kind = 'favorite') AS favorite_count,
    (SELECT COUNT(*) FROM comments c
      WHERE c.article_uuid = a.uuid AND c.is_deleted = 0) AS comment_count
 FROM articles a
 INNER JOIN users u ON u.uuid = a.created_by";

/// Whitelisted sort columns for article listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    Title,
    ViewCount,
}

impl SortField {
    /// Parses a request value; anything unrecognized falls back to
    /// `CreatedAt` instead of erroring.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "title" => Self::Title,
            "view_count" => Self::ViewCount,
            _ => Self::CreatedAt,
        }
    }

    fn order_expr(self) -> &'static str {
        match self {
            Self::CreatedAt => "a.created_at",
            Self::Title => "a.title COLLATE NOCASE",
            Self::ViewCount => "a.view_count",
        }
    }
}

/// Sort direction for article listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parses a request value; anything unrecognized falls back to `Desc`.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Composable filter/sort/paginate descriptor for published listings.
///
/// Category and author filters compose with AND semantics; the search term
/// matches title, body, summary or any attached category name (OR).
#[derive(Debug, Clone, Default)]
pub struct ArticleListQuery {
    pub category_slug: Option<String>,
    pub author: Option<UserId>,
    /// Already validated by the service layer (minimum length).
    pub search_term: Option<String>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    /// 1-based page number.
    pub page: u32,
    pub page_size: Option<u32>,
}

/// Article read model with author, categories and aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub article: Article,
    pub author: UserSummary,
    pub categories: Vec<Category>,
    pub like_count: u32,
    pub bookmark_count: u32,
    pub favorite_count: u32,
    pub comment_count: u32,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Repository interface for article persistence and listings.
pub trait ArticleRepository {
    /// Persists a new article and attaches `categories` atomically.
    /// Unknown category ids abort with `NotFound { entity: "category" }`.
    fn create_article(&mut self, article: &Article, categories: &[CategoryId])
        -> RepoResult<ArticleId>;
    /// Replaces the stored article fields; when `categories` is `Some`,
    /// replaces the full association set in the same transaction.
    fn update_article(
        &mut self,
        article: &Article,
        categories: Option<&[CategoryId]>,
    ) -> RepoResult<()>;
    fn get_article(&self, id: ArticleId, include_deleted: bool) -> RepoResult<Option<Article>>;
    /// Full read model for one active (non-deleted) article of any status.
    fn get_record(&self, id: ArticleId) -> RepoResult<Option<ArticleRecord>>;
    /// Published articles only, filtered/sorted/paginated per `query`.
    fn list_published(&self, query: &ArticleListQuery) -> RepoResult<Page<ArticleRecord>>;
    /// All active articles of one author, optionally narrowed by status.
    fn list_by_author(
        &self,
        author: UserId,
        status: Option<ArticleStatus>,
        page: u32,
        page_size: Option<u32>,
    ) -> RepoResult<Page<ArticleRecord>>;
    /// Active articles the user has reacted to with `kind`, newest first.
    fn list_reacted_by(
        &self,
        user: UserId,
        kind: ReactionKind,
        page: u32,
        page_size: Option<u32>,
    ) -> RepoResult<Page<ArticleRecord>>;
    /// Atomic `view_count = view_count + 1` for an active article.
    fn increment_view_count(&self, id: ArticleId) -> RepoResult<()>;
    fn soft_delete_article(&self, id: ArticleId) -> RepoResult<()>;
    /// Active slugs that could collide with `base` (`base` or `base-...`).
    fn slug_variants(&self, base: &str) -> RepoResult<Vec<String>>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn create_article(
        &mut self,
        article: &Article,
        categories: &[CategoryId],
    ) -> RepoResult<ArticleId> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO articles (
                uuid,
                title,
                body,
                summary,
                image_ref,
                status,
                slug,
                view_count,
                created_by,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                article.uuid.to_string(),
                article.title.as_str(),
                article.body.as_str(),
                article.summary.as_deref(),
                article.image_ref.as_deref(),
                article.status.as_str(),
                article.slug.as_str(),
                article.view_count,
                article.created_by.to_string(),
                bool_to_int(article.is_deleted),
            ],
        )
        .map_err(|err| map_unique_violation(err, "articles.slug"))?;

        attach_categories(&tx, article.uuid, categories)?;
        tx.commit()?;

        Ok(article.uuid)
    }

    fn update_article(
        &mut self,
        article: &Article,
        categories: Option<&[CategoryId]>,
    ) -> RepoResult<()> {
        let tx = self.conn.transaction()?;

        let changed = tx
            .execute(
                "UPDATE articles
                 SET
                    title = ?2,
                    body = ?3,
                    summary = ?4,
                    image_ref = ?5,
                    status = ?6,
                    slug = ?7,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1
                   AND is_deleted = 0;",
                params![
                    article.uuid.to_string(),
                    article.title.as_str(),
                    article.body.as_str(),
                    article.summary.as_deref(),
                    article.image_ref.as_deref(),
                    article.status.as_str(),
                    article.slug.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "articles.slug"))?;

        if changed == 0 {
            return Err(RepoError::not_found("article", article.uuid));
        }

        if let Some(categories) = categories {
            tx.execute(
                "DELETE FROM article_categories WHERE article_uuid = ?1;",
                [article.uuid.to_string()],
            )?;
            attach_categories(&tx, article.uuid, categories)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_article(&self, id: ArticleId, include_deleted: bool) -> RepoResult<Option<Article>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                uuid,
                title,
                body,
                summary,
                image_ref,
                status,
                slug,
                view_count,
                created_by,
                is_deleted
             FROM articles
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);",
        )?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_article_fields(row)?));
        }

        Ok(None)
    }

    fn get_record(&self, id: ArticleId) -> RepoResult<Option<ArticleRecord>> {
        let conn: &Connection = self.conn;
        let mut stmt = conn.prepare(&format!(
            "{ARTICLE_RECORD_SELECT_SQL}
             WHERE a.uuid = ?1
               AND a.is_deleted = 0;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut record = parse_article_record(row)?;
            record.categories = load_categories_for_article(conn, record.article.uuid)?;
            return Ok(Some(record));
        }

        Ok(None)
    }

    fn list_published(&self, query: &ArticleListQuery) -> RepoResult<Page<ArticleRecord>> {
        let mut filters = String::from(" WHERE a.is_deleted = 0 AND a.status = 'published'");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(slug) = query.category_slug.as_ref() {
            filters.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM article_categories ac
                    INNER JOIN categories cat ON cat.uuid = ac.category_uuid
                    WHERE ac.article_uuid = a.uuid
                      AND cat.slug = ?
                )",
            );
            bind_values.push(Value::Text(slug.clone()));
        }

        if let Some(author) = query.author {
            filters.push_str(" AND a.created_by = ?");
            bind_values.push(Value::Text(author.to_string()));
        }

        if let Some(term) = query.search_term.as_ref() {
            let pattern = format!("%{}%", escape_like(term));
            filters.push_str(
                " AND (a.title LIKE ? ESCAPE '\\'
                    OR a.body LIKE ? ESCAPE '\\'
                    OR a.summary LIKE ? ESCAPE '\\'
                    OR EXISTS (
                        SELECT 1
                        FROM article_categories ac
                        INNER JOIN categories cat ON cat.uuid = ac.category_uuid
                        WHERE ac.article_uuid = a.uuid
                          AND cat.name LIKE ? ESCAPE '\\'
                    ))",
            );
            for _ in 0..4 {
                bind_values.push(Value::Text(pattern.clone()));
            }
        }

        let order = format!(
            " ORDER BY {} {}, a.uuid ASC",
            query.sort_field.order_expr(),
            query.sort_direction.as_sql()
        );

        self.run_page_query(&filters, bind_values, &order, query.page, query.page_size)
    }

    fn list_by_author(
        &self,
        author: UserId,
        status: Option<ArticleStatus>,
        page: u32,
        page_size: Option<u32>,
    ) -> RepoResult<Page<ArticleRecord>> {
        let mut filters = String::from(" WHERE a.is_deleted = 0 AND a.created_by = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(author.to_string())];

        if let Some(status) = status {
            filters.push_str(" AND a.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        self.run_page_query(
            &filters,
            bind_values,
            " ORDER BY a.created_at DESC, a.uuid ASC",
            page,
            page_size,
        )
    }

    fn list_reacted_by(
        &self,
        user: UserId,
        kind: ReactionKind,
        page: u32,
        page_size: Option<u32>,
    ) -> RepoResult<Page<ArticleRecord>> {
        let filters = " WHERE a.is_deleted = 0
               AND EXISTS (
                    SELECT 1
                    FROM reactions r
                    WHERE r.article_uuid = a.uuid
                      AND r.user_uuid = ?
                      AND r.kind = ?
               )";
        let bind_values = vec![
            Value::Text(user.to_string()),
            Value::Text(kind.as_str().to_string()),
        ];

        self.run_page_query(
            filters,
            bind_values,
            " ORDER BY a.created_at DESC, a.uuid ASC",
            page,
            page_size,
        )
    }

    fn increment_view_count(&self, id: ArticleId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE articles
             SET view_count = view_count + 1
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("article", id));
        }

        Ok(())
    }

    fn soft_delete_article(&self, id: ArticleId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE articles
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("article", id));
        }

        Ok(())
    }

    fn slug_variants(&self, base: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT slug
             FROM articles
             WHERE is_deleted = 0
               AND (slug = ?1 OR slug LIKE ?1 || '-%');",
        )?;

        let mut rows = stmt.query([base])?;
        let mut slugs = Vec::new();
        while let Some(row) = rows.next()? {
            slugs.push(row.get::<_, String>(0)?);
        }

        Ok(slugs)
    }
}

impl SqliteArticleRepository<'_> {
    fn run_page_query(
        &self,
        filters: &str,
        bind_values: Vec<Value>,
        order: &str,
        page: u32,
        page_size: Option<u32>,
    ) -> RepoResult<Page<ArticleRecord>> {
        let conn: &Connection = self.conn;
        let page = normalize_page(page);
        let page_size =
            normalize_page_size(page_size, ARTICLES_DEFAULT_PAGE_SIZE, ARTICLES_PAGE_SIZE_MAX);

        let total_count: i64 = {
            let count_sql = format!("SELECT COUNT(*) FROM articles a{filters};");
            let mut stmt = conn.prepare(&count_sql)?;
            stmt.query_row(params_from_iter(bind_values.iter().cloned()), |row| {
                row.get(0)
            })?
        };

        let mut sql = format!("{ARTICLE_RECORD_SELECT_SQL}{filters}{order}");
        sql.push_str(" LIMIT ? OFFSET ?");
        let mut page_binds = bind_values;
        page_binds.push(Value::Integer(i64::from(page_size)));
        // Widen before multiplying: huge page numbers must not overflow.
        page_binds.push(Value::Integer(i64::from(page - 1) * i64::from(page_size)));

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(page_binds))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = parse_article_record(row)?;
            record.categories = load_categories_for_article(conn, record.article.uuid)?;
            items.push(record);
        }

        Ok(Page {
            items,
            page,
            page_size,
            total_count: total_count.max(0) as u64,
        })
    }
}

fn attach_categories(
    tx: &Transaction<'_>,
    article_id: ArticleId,
    categories: &[CategoryId],
) -> RepoResult<()> {
    for category_id in categories {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO article_categories (article_uuid, category_uuid)
             SELECT ?1, uuid
             FROM categories
             WHERE uuid = ?2;",
            params![article_id.to_string(), category_id.to_string()],
        )?;

        if inserted == 0 {
            // Either the id is unknown or the pair is already attached;
            // distinguish so unknown ids abort the transaction.
            let exists: i64 = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE uuid = ?1);",
                [category_id.to_string()],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(RepoError::not_found("category", category_id));
            }
        }
    }

    Ok(())
}

fn parse_article_fields(row: &Row<'_>) -> RepoResult<Article> {
    let uuid_text: String = row.get("uuid")?;
    let status_text: String = row.get("status")?;
    let created_by_text: String = row.get("created_by")?;

    Ok(Article {
        uuid: parse_uuid(&uuid_text, "articles.uuid")?,
        title: row.get("title")?,
        body: row.get("body")?,
        summary: row.get("summary")?,
        image_ref: row.get("image_ref")?,
        status: ArticleStatus::parse(&status_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid status `{status_text}` in articles.status"))
        })?,
        slug: row.get("slug")?,
        view_count: row.get("view_count")?,
        created_by: parse_uuid(&created_by_text, "articles.created_by")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "articles.is_deleted")?,
    })
}

fn parse_article_record(row: &Row<'_>) -> RepoResult<ArticleRecord> {
    let article = parse_article_fields(row)?;
    let author = UserSummary {
        uuid: article.created_by,
        name: row.get("author_name")?,
        handle: row.get("author_handle")?,
        avatar_ref: row.get("author_avatar_ref")?,
    };

    Ok(ArticleRecord {
        article,
        author,
        categories: Vec::new(),
        like_count: row.get("like_count")?,
        bookmark_count: row.get("bookmark_count")?,
        favorite_count: row.get("favorite_count")?,
        comment_count: row.get("comment_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_categories_for_article(
    conn: &Connection,
    article_id: ArticleId,
) -> RepoResult<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT cat.uuid, cat.name, cat.slug
         FROM article_categories ac
         INNER JOIN categories cat ON cat.uuid = ac.category_uuid
         WHERE ac.article_uuid = ?1
         ORDER BY cat.name COLLATE NOCASE ASC;",
    )?;

    let mut rows = stmt.query([article_id.to_string()])?;
    let mut categories = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get(0)?;
        categories.push(Category {
            uuid: parse_uuid(&uuid_text, "categories.uuid")?,
            name: row.get(1)?,
            slug: row.get(2)?,
        });
    }

    Ok(categories)
}
