//! Thread-safe TTL cache built on moka

use crate::expiry::{PerEntryTtl, Timed};
use moka::future::Cache;
use std::hash::Hash;
use std::time::Duration;
use tracing::debug;

/// Shared key/value cache where each entry has its own TTL.
///
/// Cloning is cheap and every clone sees the same entries, so one instance can
/// be built at startup and handed to every component that needs it.
pub struct EntryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, Timed<V>>,
}

impl<K, V> EntryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty, unbounded cache
    pub fn new() -> Self {
        let inner = Cache::builder().expire_after(PerEntryTtl).build();
        Self { inner }
    }

    /// Return the value for `key` if it has not expired.
    ///
    /// Does not extend the entry's lifetime.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).await.map(|timed| timed.value)
    }

    /// Insert or replace `key`, resetting its expiry to `ttl` from now
    pub async fn set(&self, key: K, value: V, ttl: Duration) {
        self.inner.insert(key, Timed { value, ttl }).await;
    }

    /// Remove `key` if present
    pub async fn invalidate(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    /// Drop every entry
    pub fn clear(&self) {
        debug!(entries = self.inner.entry_count(), "Clearing entry cache");
        self.inner.invalidate_all();
    }
}

impl<K, V> Clone for EntryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Default for EntryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
