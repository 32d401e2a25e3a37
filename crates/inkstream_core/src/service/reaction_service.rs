//! Reaction ledger orchestration.
//!
//! # Invariants
//! - Adding an existing reaction is idempotent and reports the stored row.
//! - Removing an absent reaction is an error, not a no-op.
//! - All operations target active articles only.

use crate::model::article::ArticleId;
use crate::model::reaction::{Reaction, ReactionCounts, ReactionKind, UserReactionState};
use crate::model::user::UserId;
use crate::repo::reaction_repo::ReactionRepository;
use crate::service::{DomainError, ServiceResult};
use log::info;
use uuid::Uuid;

/// Result of an add: the stored reaction plus whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub reaction: Reaction,
    pub created: bool,
}

/// Service for placing and removing reactions and reading aggregates.
pub struct ReactionService<R: ReactionRepository> {
    repo: R,
}

impl<R: ReactionRepository> ReactionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Places a reaction; repeating the call returns the existing row with
    /// `created = false`.
    pub fn add(
        &self,
        user: UserId,
        article_id: ArticleId,
        kind: ReactionKind,
    ) -> ServiceResult<ReactionOutcome> {
        self.ensure_article_active(article_id)?;

        let created = self
            .repo
            .insert_reaction(Uuid::new_v4(), article_id, user, kind)?;
        let reaction = self
            .repo
            .get_reaction(article_id, user, kind)?
            .ok_or_else(|| DomainError::not_found("reaction", article_id))?;

        if created {
            info!(
                "event=reaction_add module=reaction_service status=ok kind={} article={article_id}",
                kind.as_str()
            );
        }
        Ok(ReactionOutcome { reaction, created })
    }

    /// Removes a reaction; absent rows are reported as `NotFound`.
    pub fn remove(
        &self,
        user: UserId,
        article_id: ArticleId,
        kind: ReactionKind,
    ) -> ServiceResult<()> {
        self.ensure_article_active(article_id)?;

        if !self.repo.delete_reaction(article_id, user, kind)? {
            return Err(DomainError::not_found("reaction", article_id));
        }

        info!(
            "event=reaction_remove module=reaction_service status=ok kind={} article={article_id}",
            kind.as_str()
        );
        Ok(())
    }

    /// Per-kind totals for one active article.
    pub fn counts_for(&self, article_id: ArticleId) -> ServiceResult<ReactionCounts> {
        self.ensure_article_active(article_id)?;
        Ok(self.repo.counts_for(article_id)?)
    }

    /// Which kinds `user` has placed on one active article.
    pub fn user_state(
        &self,
        user: UserId,
        article_id: ArticleId,
    ) -> ServiceResult<UserReactionState> {
        self.ensure_article_active(article_id)?;
        Ok(self.repo.user_state(article_id, user)?)
    }

    fn ensure_article_active(&self, article_id: ArticleId) -> ServiceResult<()> {
        if self.repo.article_is_active(article_id)? {
            Ok(())
        } else {
            Err(DomainError::not_found("article", article_id))
        }
    }
}
