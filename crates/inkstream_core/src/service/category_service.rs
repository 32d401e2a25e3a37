//! Category management.
//!
//! # Invariants
//! - Category slugs are derived from names with the same collision suffix
//!   rule as article slugs.
//! - Renaming re-derives the slug only when the name actually changed.

use crate::model::category::{Category, CategoryId};
use crate::repo::category_repo::{CategoryRepository, CategoryWithCount};
use crate::repo::RepoError;
use crate::service::{DomainError, ServiceResult};
use crate::slug::{next_slug, slugify};
use log::info;

const SLUG_RETRY_LIMIT: u32 = 3;

/// Service for category CRUD and listings.
pub struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a category with a unique derived slug.
    pub fn create_category(&self, name: &str) -> ServiceResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_input("category name must not be empty"));
        }
        let base = slugify(name).ok_or_else(|| {
            DomainError::invalid_input("category name contains no slug-usable characters")
        })?;

        let mut attempt = 0;
        loop {
            let variants = self.repo.slug_variants(&base)?;
            let category = Category::new(name, next_slug(&base, &variants));
            match self.repo.create_category(&category) {
                Ok(id) => {
                    info!("event=category_create module=category_service status=ok id={id}");
                    return Ok(category);
                }
                Err(RepoError::Conflict { .. }) if attempt < SLUG_RETRY_LIMIT => {
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Renames a category, re-deriving its slug when the name changed.
    pub fn rename_category(&self, id: CategoryId, name: &str) -> ServiceResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_input("category name must not be empty"));
        }

        let stored = self.get_category(id)?;
        if stored.name == name {
            return Ok(stored);
        }

        let base = slugify(name).ok_or_else(|| {
            DomainError::invalid_input("category name contains no slug-usable characters")
        })?;

        let mut attempt = 0;
        loop {
            let variants = self.repo.slug_variants(&base)?;
            let slug = next_slug(&base, &variants);
            match self.repo.rename_category(id, name, &slug) {
                Ok(()) => {
                    info!("event=category_rename module=category_service status=ok id={id}");
                    return self.get_category(id);
                }
                Err(RepoError::Conflict { .. }) if attempt < SLUG_RETRY_LIMIT => {
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Hard-deletes a category; its article associations go with it.
    pub fn delete_category(&self, id: CategoryId) -> ServiceResult<()> {
        self.repo.delete_category(id)?;
        info!("event=category_delete module=category_service status=ok id={id}");
        Ok(())
    }

    /// All categories with their active article counts, ordered by name.
    pub fn list_categories(&self) -> ServiceResult<Vec<CategoryWithCount>> {
        Ok(self.repo.list_categories()?)
    }

    pub fn get_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.repo
            .get_category(id)?
            .ok_or_else(|| DomainError::not_found("category", id))
    }

    pub fn get_by_slug(&self, slug: &str) -> ServiceResult<Category> {
        self.repo
            .get_by_slug(slug)?
            .ok_or_else(|| DomainError::NotFound {
                entity: "category",
                id: slug.to_string(),
            })
    }
}
