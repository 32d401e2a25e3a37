//! Slug derivation and collision handling.
//!
//! # Responsibility
//! - Normalize titles/names into lowercase, hyphenated ASCII tokens.
//! - Derive the next unique slug given the already-stored variants.
//!
//! # Invariants
//! - A collision suffix is the count of existing `base` or `base-<digits>`
//!   variants, matched exactly (never by prefix).
//! - Counting alone does not guarantee uniqueness under concurrent
//!   creation; callers must rely on the storage unique index and retry
//!   on conflict.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug charset regex"));

/// Normalizes source text into a slug base.
///
/// Lowercases, replaces every run of non `a-z0-9` characters (including
/// non-ASCII) with a single hyphen and trims leading/trailing hyphens.
/// Returns `None` when nothing slug-worthy remains.
pub fn slugify(source: &str) -> Option<String> {
    let lowered = source.to_lowercase();
    let replaced = NON_SLUG_RE.replace_all(&lowered, "-");
    let trimmed = replaced.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Returns whether `candidate` is `base` itself or `base-<digits>`.
pub fn is_slug_variant(base: &str, candidate: &str) -> bool {
    if candidate == base {
        return true;
    }
    match candidate
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('-'))
    {
        Some(suffix) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Derives the next slug for `base` from already-stored candidates.
///
/// The suffix is the number of conflicting variants seen so far, so two
/// concurrent callers can compute the same result; the storage unique
/// index is the final arbiter.
pub fn next_slug(base: &str, existing: &[String]) -> String {
    let count = existing
        .iter()
        .filter(|candidate| is_slug_variant(base, candidate))
        .count();

    if count == 0 {
        base.to_string()
    } else {
        format!("{base}-{count}")
    }
}
