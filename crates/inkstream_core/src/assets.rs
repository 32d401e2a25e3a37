//! Outbound asset-store collaborator boundary.
//!
//! # Responsibility
//! - Define the contract the content lifecycle uses to store and release
//!   binary assets (article cover images, avatars).
//!
//! # Invariants
//! - The core never interprets asset references; they are opaque tokens
//!   issued by the store.
//! - Replacing or deleting an article image must release the previous
//!   reference through this boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Asset-store boundary error.
#[derive(Debug)]
pub struct AssetError {
    pub message: String,
}

impl AssetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for AssetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "asset store error: {}", self.message)
    }
}

impl Error for AssetError {}

/// External binary asset storage used by the content lifecycle.
pub trait AssetStore {
    /// Stores raw bytes and returns an opaque asset reference.
    fn store(&self, bytes: &[u8], mime_hint: &str) -> Result<String, AssetError>;
    /// Releases a previously stored asset reference.
    fn release(&self, asset_ref: &str) -> Result<(), AssetError>;
}

impl<T: AssetStore + ?Sized> AssetStore for &T {
    fn store(&self, bytes: &[u8], mime_hint: &str) -> Result<String, AssetError> {
        (**self).store(bytes, mime_hint)
    }

    fn release(&self, asset_ref: &str) -> Result<(), AssetError> {
        (**self).release(asset_ref)
    }
}

/// Asset store that accepts everything and keeps nothing.
///
/// Used by callers that manage assets upstream and only pass references in.
#[derive(Debug, Default)]
pub struct NullAssetStore;

impl AssetStore for NullAssetStore {
    fn store(&self, _bytes: &[u8], mime_hint: &str) -> Result<String, AssetError> {
        Ok(format!("null:{mime_hint}"))
    }

    fn release(&self, _asset_ref: &str) -> Result<(), AssetError> {
        Ok(())
    }
}

/// In-memory asset store that records stored and released references.
///
/// Intended for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    stored: Mutex<Vec<String>>,
    released: Mutex<Vec<String>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// References handed out by `store`, in call order.
    pub fn stored_refs(&self) -> Vec<String> {
        self.stored.lock().expect("asset store lock poisoned").clone()
    }

    /// References passed to `release`, in call order.
    pub fn released_refs(&self) -> Vec<String> {
        self.released
            .lock()
            .expect("asset store lock poisoned")
            .clone()
    }
}

impl AssetStore for MemoryAssetStore {
    fn store(&self, _bytes: &[u8], mime_hint: &str) -> Result<String, AssetError> {
        let mut stored = self.stored.lock().expect("asset store lock poisoned");
        let asset_ref = format!("mem:{}:{}", stored.len(), mime_hint);
        stored.push(asset_ref.clone());
        Ok(asset_ref)
    }

    fn release(&self, asset_ref: &str) -> Result<(), AssetError> {
        self.released
            .lock()
            .expect("asset store lock poisoned")
            .push(asset_ref.to_string());
        Ok(())
    }
}
