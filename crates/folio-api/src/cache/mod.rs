//! Read-through response caches for the document store
//!
//! Both facades share one `ResponseCache`. Reads check the cache first and
//! fill it from the store on a miss; writes go straight to the store and then
//! drop every key the written record could have populated. Nothing is cached
//! when a store call fails.

mod messages;
mod timeline;

pub use messages::MessageCache;
pub use timeline::TimelineCache;

use chrono::NaiveDate;
use folio_db::{Message, MessageStats, TimelineItem};
use std::sync::Arc;
use std::time::Duration;
use ttl_entry_cache::EntryCache;

/// TTL for the timeline list and per-date lookups.
pub const TIMELINE_TTL: Duration = Duration::from_secs(5 * 60);

/// TTL for the message list.
pub const MESSAGES_TTL: Duration = Duration::from_secs(2 * 60);

/// TTL for derived message stats.
pub const MESSAGE_STATS_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    TimelineAll,
    /// Keyed by calendar date only, so every time on that day shares a slot
    TimelineByDate(NaiveDate),
    MessagesAll,
    MessageStats,
}

#[derive(Debug, Clone)]
pub enum CachedValue {
    Timeline(Arc<Vec<TimelineItem>>),
    TimelineItem(Arc<TimelineItem>),
    Messages(Arc<Vec<Message>>),
    MessageStats(MessageStats),
}

pub type ResponseCache = EntryCache<CacheKey, CachedValue>;
