//! Threaded comment orchestration.
//!
//! # Invariants
//! - Comments attach only to active articles; replies attach only to
//!   active parents and inherit the parent's article.
//! - Edits and removals are owner-gated.
//! - The listing shows approved roots with their direct replies; deeper
//!   descendants stay stored but hidden.

use crate::auth::ensure_can_mutate;
use crate::model::article::ArticleId;
use crate::model::comment::{Comment, CommentId, CommentStatus};
use crate::model::user::UserId;
use crate::repo::comment_repo::{CommentRecord, CommentRepository, CommentThreadEntry};
use crate::repo::Page;
use crate::service::{DomainError, ServiceResult};
use log::info;

/// How newly created comments enter the moderation pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModerationPolicy {
    /// New comments are visible immediately.
    #[default]
    AutoApprove,
    /// New comments wait in `pending` until approved out of band.
    HoldForReview,
}

impl ModerationPolicy {
    fn initial_status(self) -> CommentStatus {
        match self {
            Self::AutoApprove => CommentStatus::Approved,
            Self::HoldForReview => CommentStatus::Pending,
        }
    }
}

/// Service for creating, editing and listing threaded comments.
pub struct CommentService<R: CommentRepository> {
    repo: R,
    policy: ModerationPolicy,
}

impl<R: CommentRepository> CommentService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            policy: ModerationPolicy::default(),
        }
    }

    pub fn with_policy(repo: R, policy: ModerationPolicy) -> Self {
        Self { repo, policy }
    }

    /// Creates a root comment on an active article.
    pub fn create_comment(
        &self,
        author: UserId,
        article_id: ArticleId,
        content: &str,
    ) -> ServiceResult<CommentRecord> {
        let content = validated_content(content)?;
        if !self.repo.article_is_active(article_id)? {
            return Err(DomainError::not_found("article", article_id));
        }

        let mut comment = Comment::new(article_id, author, content);
        comment.status = self.policy.initial_status();
        let id = self.repo.create_comment(&comment)?;

        info!("event=comment_create module=comment_service status=ok id={id}");
        self.load_record(id)
    }

    /// Creates a reply under an existing active comment.
    pub fn reply(
        &self,
        author: UserId,
        parent_id: CommentId,
        content: &str,
    ) -> ServiceResult<CommentRecord> {
        let content = validated_content(content)?;
        let parent = self
            .repo
            .get_comment(parent_id, false)?
            .ok_or_else(|| DomainError::invalid_input("parent comment does not exist"))?;
        if !self.repo.article_is_active(parent.article_id)? {
            return Err(DomainError::not_found("article", parent.article_id));
        }

        let mut comment = Comment::reply_to(&parent, author, content);
        comment.status = self.policy.initial_status();
        let id = self.repo.create_comment(&comment)?;

        info!("event=comment_reply module=comment_service status=ok id={id} parent={parent_id}");
        self.load_record(id)
    }

    /// Replaces the content of the acting user's own comment.
    pub fn update_comment(
        &self,
        acting_user: UserId,
        id: CommentId,
        content: &str,
    ) -> ServiceResult<CommentRecord> {
        let content = validated_content(content)?;
        let stored = self
            .repo
            .get_comment(id, false)?
            .ok_or_else(|| DomainError::not_found("comment", id))?;
        ensure_can_mutate("update_comment", acting_user, stored.author_id)?;

        self.repo.update_content(id, content)?;
        self.load_record(id)
    }

    /// Soft-deletes the acting user's own comment.
    pub fn delete_comment(&self, acting_user: UserId, id: CommentId) -> ServiceResult<()> {
        let stored = self
            .repo
            .get_comment(id, false)?
            .ok_or_else(|| DomainError::not_found("comment", id))?;
        ensure_can_mutate("delete_comment", acting_user, stored.author_id)?;

        self.repo.soft_delete_comment(id)?;
        info!("event=comment_delete module=comment_service status=ok id={id}");
        Ok(())
    }

    /// Two-level thread listing for an active article.
    pub fn list_for_article(
        &self,
        article_id: ArticleId,
        page: u32,
        page_size: Option<u32>,
    ) -> ServiceResult<Page<CommentThreadEntry>> {
        if !self.repo.article_is_active(article_id)? {
            return Err(DomainError::not_found("article", article_id));
        }

        Ok(self.repo.list_roots(article_id, page, page_size)?)
    }

    fn load_record(&self, id: CommentId) -> ServiceResult<CommentRecord> {
        self.repo
            .get_record(id)?
            .ok_or_else(|| DomainError::not_found("comment", id))
    }
}

fn validated_content(content: &str) -> ServiceResult<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input("comment content must not be empty"));
    }
    Ok(trimmed)
}
