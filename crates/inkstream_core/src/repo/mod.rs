//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Uniqueness invariants (slugs, reaction triples, follow pairs,
//!   handles/emails) are enforced by SQL constraints; repositories surface
//!   violations as `RepoError::Conflict`, never swallow them.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod article_repo;
pub mod category_repo;
pub mod comment_repo;
pub mod follow_repo;
pub mod reaction_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound {
        entity: &'static str,
        id: String,
    },
    /// A storage uniqueness constraint fired despite application pre-checks.
    Conflict {
        constraint: &'static str,
        message: String,
    },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict {
                constraint,
                message,
            } => write!(f, "uniqueness violation on {constraint}: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Page envelope returned by all listing operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually applied.
    pub page: u32,
    /// Page size actually applied.
    pub page_size: u32,
    /// Total matching rows across all pages.
    pub total_count: u64,
}

/// Normalizes a 1-based page number; page 0 means the first page.
pub fn normalize_page(page: u32) -> u32 {
    page.max(1)
}

/// Normalizes a requested page size against a default and a hard cap.
pub fn normalize_page_size(requested: Option<u32>, default_size: u32, max_size: u32) -> u32 {
    match requested {
        Some(0) => default_size,
        Some(value) if value > max_size => max_size,
        Some(value) => value,
        None => default_size,
    }
}

/// Returns whether a SQLite error is a UNIQUE/PRIMARY KEY violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Maps an insert error to `Conflict` when a uniqueness constraint fired.
pub(crate) fn map_unique_violation(err: rusqlite::Error, constraint: &'static str) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::Conflict {
            constraint,
            message: err.to_string(),
        }
    } else {
        err.into()
    }
}

/// Escapes `%`, `_` and the escape character itself for LIKE patterns
/// used with `ESCAPE '\'`.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_like, normalize_page, normalize_page_size};

    #[test]
    fn page_zero_becomes_first_page() {
        assert_eq!(normalize_page(0), 1);
        assert_eq!(normalize_page(7), 7);
    }

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(normalize_page_size(None, 10, 50), 10);
        assert_eq!(normalize_page_size(Some(0), 10, 50), 10);
        assert_eq!(normalize_page_size(Some(25), 10, 50), 25);
        assert_eq!(normalize_page_size(Some(500), 10, 50), 50);
    }

    #[test]
    fn like_escaping_covers_wildcards() {
        assert_eq!(escape_like("50%_off\\now"), "50\\%\\_off\\\\now");
        assert_eq!(escape_like("plain"), "plain");
    }
}
