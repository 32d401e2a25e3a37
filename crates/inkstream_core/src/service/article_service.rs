//! Article lifecycle orchestration: create, update, delete, view and the
//! published listings.
//!
//! # Invariants
//! - Every mutation passes the ownership guard before any state change.
//! - The slug is derived from the title on create and re-derived only when
//!   an update actually changes the title.
//! - A replaced or deleted cover image releases the previous asset
//!   reference exactly once.

use crate::assets::AssetStore;
use crate::auth::ensure_can_mutate;
use crate::model::article::{Article, ArticleId, ArticleStatus};
use crate::model::category::CategoryId;
use crate::model::reaction::ReactionKind;
use crate::model::user::UserId;
use crate::repo::article_repo::{
    ArticleListQuery, ArticleRecord, ArticleRepository, SortDirection, SortField,
};
use crate::repo::{Page, RepoError};
use crate::service::{DomainError, ServiceResult};
use crate::slug::{next_slug, slugify};
use log::info;

/// Bounded retries when the storage slug index beats the derived suffix.
const SLUG_RETRY_LIMIT: u32 = 3;

/// Minimum length of a usable search term.
const SEARCH_TERM_MIN_CHARS: usize = 3;

/// Input payload for creating an article.
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub title: String,
    pub body: String,
    pub summary: Option<String>,
    /// Asset reference for the cover image, already stored upstream.
    pub image_ref: Option<String>,
    /// Request status value; `None` publishes immediately.
    pub status: Option<String>,
    pub categories: Vec<CategoryId>,
}

/// Partial update payload; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub summary: Option<String>,
    pub status: Option<String>,
    /// `Some` replaces the cover image and releases the previous asset.
    pub image_ref: Option<String>,
    /// `Some` replaces the full category set.
    pub categories: Option<Vec<CategoryId>>,
}

/// Request form of the published-articles listing query.
#[derive(Debug, Clone, Default)]
pub struct ArticleQueryRequest {
    pub category_slug: Option<String>,
    pub author: Option<UserId>,
    pub search_term: Option<String>,
    /// Request value; unknown fields fall back to `created_at`.
    pub sort_field: Option<String>,
    /// Request value; unknown directions fall back to `desc`.
    pub sort_direction: Option<String>,
    pub page: u32,
    pub page_size: Option<u32>,
}

/// Service for the article lifecycle and listings.
pub struct ArticleService<R: ArticleRepository, S: AssetStore> {
    repo: R,
    assets: S,
}

impl<R: ArticleRepository, S: AssetStore> ArticleService<R, S> {
    pub fn new(repo: R, assets: S) -> Self {
        Self { repo, assets }
    }

    /// Creates an article for `author` and returns the stored read model.
    pub fn create_article(
        &mut self,
        author: UserId,
        draft: ArticleDraft,
    ) -> ServiceResult<ArticleRecord> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(DomainError::invalid_input("title must not be empty"));
        }
        if draft.body.trim().is_empty() {
            return Err(DomainError::invalid_input("body must not be empty"));
        }

        let status = parse_status(draft.status.as_deref())?.unwrap_or(ArticleStatus::Published);
        let base = slugify(title).ok_or_else(|| {
            DomainError::invalid_input("title contains no slug-usable characters")
        })?;

        let mut attempt = 0;
        let id = loop {
            let variants = self.repo.slug_variants(&base)?;
            let mut article = Article::new(author, title, draft.body.as_str(), next_slug(&base, &variants));
            article.summary = draft.summary.clone();
            article.image_ref = draft.image_ref.clone();
            article.status = status;

            match self.repo.create_article(&article, &draft.categories) {
                Ok(id) => break id,
                Err(RepoError::Conflict { .. }) if attempt < SLUG_RETRY_LIMIT => {
                    attempt += 1;
                }
                Err(RepoError::NotFound { entity: "category", id }) => {
                    return Err(DomainError::invalid_input(format!(
                        "unknown category id: {id}"
                    )));
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!("event=article_create module=article_service status=ok id={id}");
        self.load_record(id)
    }

    /// Applies a partial update after the ownership check.
    pub fn update_article(
        &mut self,
        acting_user: UserId,
        id: ArticleId,
        patch: ArticlePatch,
    ) -> ServiceResult<ArticleRecord> {
        let stored = self
            .repo
            .get_article(id, false)?
            .ok_or_else(|| DomainError::not_found("article", id))?;
        ensure_can_mutate("update_article", acting_user, stored.created_by)?;

        let title_changed = patch
            .title
            .as_deref()
            .map(str::trim)
            .is_some_and(|title| title != stored.title);

        let mut article = stored.clone();
        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(DomainError::invalid_input("title must not be empty"));
            }
            article.title = title;
        }
        if let Some(body) = patch.body {
            if body.trim().is_empty() {
                return Err(DomainError::invalid_input("body must not be empty"));
            }
            article.body = body;
        }
        if let Some(summary) = patch.summary {
            article.summary = Some(summary);
        }
        if let Some(status) = parse_status(patch.status.as_deref())? {
            article.status = status;
        }

        let released_image = match patch.image_ref {
            Some(new_ref) => {
                let previous = article.image_ref.replace(new_ref);
                previous.filter(|old| Some(old.as_str()) != article.image_ref.as_deref())
            }
            None => None,
        };

        let categories = patch.categories.as_deref();
        if title_changed {
            let base = slugify(&article.title).ok_or_else(|| {
                DomainError::invalid_input("title contains no slug-usable characters")
            })?;
            let mut attempt = 0;
            loop {
                let variants = self.repo.slug_variants(&base)?;
                article.slug = next_slug(&base, &variants);
                match self.repo.update_article(&article, categories) {
                    Ok(()) => break,
                    Err(RepoError::Conflict { .. }) if attempt < SLUG_RETRY_LIMIT => {
                        attempt += 1;
                    }
                    Err(err) => return Err(map_category_not_found(err)),
                }
            }
        } else {
            self.repo
                .update_article(&article, categories)
                .map_err(map_category_not_found)?;
        }

        if let Some(old_ref) = released_image {
            self.assets.release(&old_ref)?;
        }

        info!("event=article_update module=article_service status=ok id={id}");
        self.load_record(id)
    }

    /// Soft-deletes an article and releases its cover image.
    pub fn delete_article(&mut self, acting_user: UserId, id: ArticleId) -> ServiceResult<()> {
        let stored = self
            .repo
            .get_article(id, false)?
            .ok_or_else(|| DomainError::not_found("article", id))?;
        ensure_can_mutate("delete_article", acting_user, stored.created_by)?;

        self.repo.soft_delete_article(id)?;
        if let Some(image_ref) = stored.image_ref {
            self.assets.release(&image_ref)?;
        }

        info!("event=article_delete module=article_service status=ok id={id}");
        Ok(())
    }

    /// Records one view and returns the article read model.
    pub fn view_article(&mut self, id: ArticleId) -> ServiceResult<ArticleRecord> {
        self.repo.increment_view_count(id)?;
        self.load_record(id)
    }

    /// Read model without counting a view.
    pub fn get_article(&mut self, id: ArticleId) -> ServiceResult<ArticleRecord> {
        self.load_record(id)
    }

    /// Published listing with composable filters, sorting and pagination.
    pub fn list_articles(
        &mut self,
        request: ArticleQueryRequest,
    ) -> ServiceResult<Page<ArticleRecord>> {
        let search_term = match request.search_term.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                if term.chars().count() < SEARCH_TERM_MIN_CHARS {
                    return Err(DomainError::invalid_input(format!(
                        "search term must be at least {SEARCH_TERM_MIN_CHARS} characters"
                    )));
                }
                Some(term.to_string())
            }
            _ => None,
        };

        let query = ArticleListQuery {
            category_slug: request.category_slug,
            author: request.author,
            search_term,
            sort_field: request
                .sort_field
                .as_deref()
                .map(SortField::parse_or_default)
                .unwrap_or_default(),
            sort_direction: request
                .sort_direction
                .as_deref()
                .map(SortDirection::parse_or_default)
                .unwrap_or_default(),
            page: request.page,
            page_size: request.page_size,
        };

        Ok(self.repo.list_published(&query)?)
    }

    /// The author's own articles of any status, optionally narrowed.
    pub fn my_articles(
        &mut self,
        author: UserId,
        status: Option<&str>,
        page: u32,
        page_size: Option<u32>,
    ) -> ServiceResult<Page<ArticleRecord>> {
        let status = match status {
            Some(value) => Some(
                ArticleStatus::parse(value)
                    .ok_or_else(|| DomainError::invalid_input(format!("unknown status: {value}")))?,
            ),
            None => None,
        };

        Ok(self.repo.list_by_author(author, status, page, page_size)?)
    }

    /// Active articles the user has reacted to with `kind`.
    pub fn reacted_articles(
        &mut self,
        user: UserId,
        kind: &str,
        page: u32,
        page_size: Option<u32>,
    ) -> ServiceResult<Page<ArticleRecord>> {
        let kind = ReactionKind::parse(kind)
            .ok_or_else(|| DomainError::invalid_input(format!("unknown reaction kind: {kind}")))?;

        Ok(self.repo.list_reacted_by(user, kind, page, page_size)?)
    }

    fn load_record(&mut self, id: ArticleId) -> ServiceResult<ArticleRecord> {
        self.repo
            .get_record(id)?
            .ok_or_else(|| DomainError::not_found("article", id))
    }
}

fn parse_status(value: Option<&str>) -> ServiceResult<Option<ArticleStatus>> {
    match value {
        Some(value) => ArticleStatus::parse(value)
            .map(Some)
            .ok_or_else(|| DomainError::invalid_input(format!("unknown status: {value}"))),
        None => Ok(None),
    }
}

fn map_category_not_found(err: RepoError) -> DomainError {
    match err {
        RepoError::NotFound {
            entity: "category",
            id,
        } => DomainError::invalid_input(format!("unknown category id: {id}")),
        other => other.into(),
    }
}
