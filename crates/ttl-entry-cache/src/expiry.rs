//! Per-entry expiration policy

use moka::Expiry;
use std::time::{Duration, Instant};

/// A cached value together with the TTL it was written with
#[derive(Debug, Clone)]
pub(crate) struct Timed<V> {
    pub value: V,
    pub ttl: Duration,
}

/// Expires each entry `ttl` after it was created or last replaced.
///
/// Reads keep the default behaviour (remaining lifetime untouched), so there
/// is no sliding expiration.
pub(crate) struct PerEntryTtl;

impl<K, V> Expiry<K, Timed<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &K,
        value: &Timed<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        value: &Timed<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}
