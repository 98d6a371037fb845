//! In-memory entry cache with per-entry TTL
//!
//! Every entry carries its own time-to-live, fixed when the entry is written.
//! Reads never extend an entry's lifetime, writes always replace both value
//! and expiry, and invalidation of a missing key is a no-op. There is no size
//! bound: entries only leave through expiry, invalidation or `clear`.

mod cache;
mod expiry;

pub use cache::EntryCache;
