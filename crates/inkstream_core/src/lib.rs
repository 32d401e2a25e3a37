//! Core domain logic for Inkstream.
//! This crate is the single source of truth for business invariants.

pub mod assets;
pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod slug;

pub use assets::{AssetError, AssetStore, MemoryAssetStore, NullAssetStore};
pub use auth::{can_mutate, ensure_can_mutate};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{Article, ArticleId, ArticleStatus};
pub use model::category::{Category, CategoryId};
pub use model::comment::{Comment, CommentId, CommentStatus};
pub use model::reaction::{Reaction, ReactionCounts, ReactionKind, UserReactionState};
pub use model::user::{User, UserId, UserSummary};
pub use repo::article_repo::{
    ArticleListQuery, ArticleRecord, ArticleRepository, SortDirection, SortField,
    SqliteArticleRepository,
};
pub use repo::{Page, RepoError, RepoResult};
pub use service::article_service::{ArticleDraft, ArticlePatch, ArticleQueryRequest, ArticleService};
pub use service::{DomainError, ServiceResult};
pub use slug::{next_slug, slugify};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
