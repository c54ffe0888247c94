//! In-process TTL store
//!
//! Entries live in an ordered map so listing can resume from a cursor.
//! Expired entries are invisible to readers and are removed by
//! `purge_expired`, which the server runs on a fixed interval.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{KvStore, ListPage, StoreError};

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    /// `None` when the deadline does not fit the clock
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// Memory-backed store with per-entry expiration
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, StoredEntry>>,
    min_ttl: i64,
}

impl MemoryStore {
    /// Create an empty store that rejects TTLs shorter than `min_ttl` seconds
    pub fn new(min_ttl: i64) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            min_ttl: min_ttl.max(1),
        }
    }

    /// Remove expired entries, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of entries held, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey);
        }
        if ttl_seconds < self.min_ttl {
            return Err(StoreError::InvalidTtl(ttl_seconds));
        }
        let ttl = u64::try_from(ttl_seconds).map_err(|_| StoreError::InvalidTtl(ttl_seconds))?;
        let expires_at = Instant::now().checked_add(Duration::from_secs(ttl));

        self.entries.write().await.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn list(&self, cursor: Option<&str>, limit: usize) -> Result<ListPage, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let lower = cursor.map_or(Bound::Unbounded, Bound::Excluded);

        let mut live = entries
            .range::<str, _>((lower, Bound::Unbounded))
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key);

        let keys: Vec<String> = live.by_ref().take(limit.max(1)).cloned().collect();
        let more = live.next().is_some();
        let cursor = if more { keys.last().cloned() } else { None };

        Ok(ListPage { keys, cursor })
    }
}
