//! Category repository contract and SQLite implementation.
//!
//! # Invariants
//! - Category name and slug are unique across all rows (storage indexes).
//! - Deleting a category removes its article association rows in the same
//!   statement batch (FK cascade), never the articles themselves.

use crate::model::category::{Category, CategoryId};
use crate::repo::{map_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT uuid, name, slug FROM categories";

/// Category plus the number of active published articles attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryWithCount {
    pub category: Category,
    pub article_count: u32,
}

/// Repository interface for categories.
pub trait CategoryRepository {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId>;
    /// Replaces name and slug of an existing category.
    fn rename_category(&self, id: CategoryId, name: &str, slug: &str) -> RepoResult<()>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn get_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;
    /// All categories ordered by name, each with its active article count.
    fn list_categories(&self) -> RepoResult<Vec<CategoryWithCount>>;
    /// Hard delete; association rows cascade.
    fn delete_category(&self, id: CategoryId) -> RepoResult<()>;
    /// Stored slugs that could collide with `base` (`base` or `base-...`).
    fn slug_variants(&self, base: &str) -> RepoResult<Vec<String>>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId> {
        self.conn
            .execute(
                "INSERT INTO categories (uuid, name, slug) VALUES (?1, ?2, ?3);",
                params![
                    category.uuid.to_string(),
                    category.name.as_str(),
                    category.slug.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "categories.name/slug"))?;

        Ok(category.uuid)
    }

    fn rename_category(&self, id: CategoryId, name: &str, slug: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE categories
                 SET
                    name = ?2,
                    slug = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![id.to_string(), name, slug],
            )
            .map_err(|err| map_unique_violation(err, "categories.name/slug"))?;

        if changed == 0 {
            return Err(RepoError::not_found("category", id));
        }

        Ok(())
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn get_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE slug = ?1;"))?;
        let mut rows = stmt.query([slug])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn list_categories(&self) -> RepoResult<Vec<CategoryWithCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                c.uuid,
                c.name,
                c.slug,
                (SELECT COUNT(*)
                 FROM article_categories ac
                 INNER JOIN articles a ON a.uuid = ac.article_uuid
                 WHERE ac.category_uuid = c.uuid
                   AND a.is_deleted = 0) AS article_count
             FROM categories c
             ORDER BY c.name COLLATE NOCASE ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(CategoryWithCount {
                category: parse_category_row(row)?,
                article_count: row.get("article_count")?,
            });
        }

        Ok(categories)
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::not_found("category", id));
        }

        Ok(())
    }

    fn slug_variants(&self, base: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT slug
             FROM categories
             WHERE slug = ?1
                OR slug LIKE ?1 || '-%';",
        )?;

        let mut rows = stmt.query([base])?;
        let mut slugs = Vec::new();
        while let Some(row) = rows.next()? {
            slugs.push(row.get::<_, String>(0)?);
        }

        Ok(slugs)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Category {
        uuid: parse_uuid(&uuid_text, "categories.uuid")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
    })
}
