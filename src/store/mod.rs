//! Key-value store module
//!
//! Defines the storage interface the request handlers talk to:
//! - `put` with a time-to-live in seconds
//! - `get` returning `None` for absent or expired keys
//! - paginated `list` driven by an opaque cursor

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Shared handle to a store implementation
pub type SharedStore = Arc<dyn KvStore>;

/// Errors reported by a store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid expiration ttl: {0} seconds")]
    InvalidTtl(i64),

    #[error("invalid key: keys must be non-empty")]
    InvalidKey,

    /// Reserved for stores backed by a remote service
    #[allow(dead_code)]
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One page of a key listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Keys on this page, in listing order
    pub keys: Vec<String>,
    /// Continuation cursor; `None` once the listing is complete
    pub cursor: Option<String>,
}

impl ListPage {
    pub const fn is_complete(&self) -> bool {
        self.cursor.is_none()
    }
}

/// Storage interface consumed by the relay handlers
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry and its expiration
    async fn put(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<(), StoreError>;

    /// Fetch the live value for `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// List up to `limit` keys following `cursor`
    async fn list(&self, cursor: Option<&str>, limit: usize) -> Result<ListPage, StoreError>;
}

/// Count every key in the store by walking the listing page by page
///
/// Pages are fetched strictly one after another; the walk ends when the
/// store returns a page without a continuation cursor.
pub async fn count_keys(store: &dyn KvStore, page_size: usize) -> Result<u64, StoreError> {
    let mut total: u64 = 0;
    let mut cursor: Option<String> = None;

    loop {
        let page = store.list(cursor.as_deref(), page_size).await?;
        total += page.keys.len() as u64;
        if page.is_complete() {
            break;
        }
        cursor = page.cursor;
    }

    Ok(total)
}
