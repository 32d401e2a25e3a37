//! Service layer orchestrating domain rules over the repositories.
//!
//! # Responsibility
//! - Validate input, enforce ownership and lifecycle rules, and translate
//!   repository errors into domain errors callers can act on.
//!
//! # Invariants
//! - Services never touch SQL; every read and write goes through a
//!   repository trait.
//! - `NotFound` is returned for soft-deleted targets the same as for
//!   missing rows; tombstone state is not leaked.

use crate::assets::AssetError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod article_service;
pub mod category_service;
pub mod comment_service;
pub mod follow_service;
pub mod reaction_service;

pub type ServiceResult<T> = Result<T, DomainError>;

/// Domain-level error surfaced by all service operations.
#[derive(Debug)]
pub enum DomainError {
    /// The request payload failed validation.
    InvalidInput(String),
    /// The target does not exist or is soft-deleted.
    NotFound { entity: &'static str, id: String },
    /// The acting user does not own the target resource.
    Forbidden { action: &'static str },
    /// A uniqueness rule rejected the write after retries.
    Conflict(String),
    /// Persistence failed for non-semantic reasons.
    Storage(RepoError),
    /// The external asset store failed.
    Asset(AssetError),
}

impl DomainError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Forbidden { action } => write!(f, "not allowed to {action}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Asset(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DomainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Asset(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict { constraint, .. } => {
                Self::Conflict(format!("uniqueness violation on {constraint}"))
            }
            other => Self::Storage(other),
        }
    }
}

impl From<AssetError> for DomainError {
    fn from(value: AssetError) -> Self {
        Self::Asset(value)
    }
}
