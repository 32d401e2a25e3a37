//! Follow-graph orchestration.
//!
//! # Invariants
//! - Users cannot follow themselves.
//! - Follow targets must be active accounts.
//! - Repeated follows and unfollows are idempotent; both report whether
//!   the call changed anything.

use crate::model::user::{UserId, UserSummary};
use crate::repo::follow_repo::FollowRepository;
use crate::service::{DomainError, ServiceResult};
use log::info;

/// Service over the follower graph.
pub struct FollowService<R: FollowRepository> {
    repo: R,
}

impl<R: FollowRepository> FollowService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records that `follower` follows `followed`. Returns `false` when the
    /// edge already existed.
    pub fn follow(&self, follower: UserId, followed: UserId) -> ServiceResult<bool> {
        if follower == followed {
            return Err(DomainError::invalid_input("users cannot follow themselves"));
        }
        self.ensure_user_active(followed)?;

        let created = self.repo.insert_edge(follower, followed)?;
        if created {
            info!("event=follow module=follow_service status=ok follower={follower} followed={followed}");
        }
        Ok(created)
    }

    /// Removes a follow edge. Returns `false` when no edge existed.
    pub fn unfollow(&self, follower: UserId, followed: UserId) -> ServiceResult<bool> {
        let removed = self.repo.delete_edge(follower, followed)?;
        if removed {
            info!("event=unfollow module=follow_service status=ok follower={follower} followed={followed}");
        }
        Ok(removed)
    }

    /// Whether `follower` currently follows `followed`.
    pub fn is_following(&self, follower: UserId, followed: UserId) -> ServiceResult<bool> {
        Ok(self.repo.get_edge(follower, followed)?.is_some())
    }

    /// Active accounts following `user`, oldest follow first.
    pub fn followers(&self, user: UserId) -> ServiceResult<Vec<UserSummary>> {
        self.ensure_user_active(user)?;
        Ok(self.repo.list_followers(user)?)
    }

    /// Active accounts `user` follows, oldest follow first.
    pub fn following(&self, user: UserId) -> ServiceResult<Vec<UserSummary>> {
        self.ensure_user_active(user)?;
        Ok(self.repo.list_following(user)?)
    }

    fn ensure_user_active(&self, user: UserId) -> ServiceResult<()> {
        if self.repo.user_is_active(user)? {
            Ok(())
        } else {
            Err(DomainError::not_found("user", user))
        }
    }
}
