//! Owner-gated mutation checks.
//!
//! # Responsibility
//! - Decide whether an acting user may mutate an owned resource.
//!
//! # Invariants
//! - The check is pure owner equality; administrators get no override on
//!   author-owned content paths.
//! - Every article/comment mutation must pass through this guard before
//!   any state change.

use crate::model::user::UserId;
use crate::service::DomainError;

/// Returns whether `acting_user` may mutate a resource owned by `owner`.
pub fn can_mutate(acting_user: UserId, owner: UserId) -> bool {
    acting_user == owner
}

/// Guard form of [`can_mutate`] that produces the canonical `Forbidden`
/// error for mutation paths.
pub fn ensure_can_mutate(
    action: &'static str,
    acting_user: UserId,
    owner: UserId,
) -> Result<(), DomainError> {
    if can_mutate(acting_user, owner) {
        Ok(())
    } else {
        Err(DomainError::Forbidden { action })
    }
}

#[cfg(test)]
mod tests {
    use super::{can_mutate, ensure_can_mutate};
    use crate::service::DomainError;
    use uuid::Uuid;

    #[test]
    fn owner_may_mutate_own_resource() {
        let owner = Uuid::new_v4();
        assert!(can_mutate(owner, owner));
        assert!(ensure_can_mutate("update_article", owner, owner).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(!can_mutate(other, owner));
        let err = ensure_can_mutate("delete_article", other, owner).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Forbidden {
                action: "delete_article"
            }
        ));
    }
}
