use super::{CacheKey, CachedValue, ResponseCache, MESSAGES_TTL, MESSAGE_STATS_TTL};
use chrono::Utc;
use folio_db::{CreateMessageParams, DocumentStore, Message, MessageStats, StoreError};
use std::sync::Arc;
use tracing::{debug, info};

/// Visitor message reads and writes with a list cache and a stats cache
pub struct MessageCache {
    store: Arc<dyn DocumentStore>,
    cache: ResponseCache,
}

impl MessageCache {
    pub fn new(store: Arc<dyn DocumentStore>, cache: ResponseCache) -> Self {
        Self { store, cache }
    }

    /// All messages, most recent first
    pub async fn list_all(&self) -> Result<Arc<Vec<Message>>, StoreError> {
        if let Some(CachedValue::Messages(messages)) = self.cache.get(&CacheKey::MessagesAll).await
        {
            debug!(count = messages.len(), "Message list cache hit");
            return Ok(messages);
        }
        debug!("Message list cache miss");

        let messages = Arc::new(self.store.list_messages().await?);
        self.cache
            .set(
                CacheKey::MessagesAll,
                CachedValue::Messages(messages.clone()),
                MESSAGES_TTL,
            )
            .await;
        Ok(messages)
    }

    /// Direct lookup, never cached
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Message>, StoreError> {
        self.store.get_message(id).await
    }

    pub async fn create(&self, params: &CreateMessageParams) -> Result<Message, StoreError> {
        let message = self.store.create_message(params).await?;
        self.invalidate().await;
        info!(id = %message.id, "Received visitor message");
        Ok(message)
    }

    /// Persist `read = true` for `id`; `None` if it does not exist
    pub async fn mark_read(&self, id: &str) -> Result<Option<Message>, StoreError> {
        let updated = self.store.set_message_read(id, true).await?;
        if updated.is_some() {
            self.invalidate().await;
            debug!(id, "Marked message as read");
        }
        Ok(updated)
    }

    /// Delete `id`, returning whether it existed
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.store.delete_message(id).await?;
        if removed {
            self.invalidate().await;
            info!(id, "Deleted message");
        }
        Ok(removed)
    }

    /// Counts over the full message list
    pub async fn stats(&self) -> Result<MessageStats, StoreError> {
        if let Some(CachedValue::MessageStats(stats)) =
            self.cache.get(&CacheKey::MessageStats).await
        {
            debug!("Message stats cache hit");
            return Ok(stats);
        }
        debug!("Message stats cache miss");

        let messages = self.list_all().await?;
        let stats = MessageStats::compute(&messages, Utc::now());
        self.cache
            .set(
                CacheKey::MessageStats,
                CachedValue::MessageStats(stats.clone()),
                MESSAGE_STATS_TTL,
            )
            .await;
        Ok(stats)
    }

    async fn invalidate(&self) {
        self.cache.invalidate(&CacheKey::MessagesAll).await;
        self.cache.invalidate(&CacheKey::MessageStats).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_db::memory::MemoryDocumentStore;

    fn fixture() -> (Arc<MemoryDocumentStore>, ResponseCache, MessageCache) {
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = ResponseCache::new();
        let messages = MessageCache::new(store.clone(), cache.clone());
        (store, cache, messages)
    }

    fn submission(name: &str) -> CreateMessageParams {
        CreateMessageParams::new(name, "Visitor@Example.com ", "Loved the portfolio!")
    }

    #[tokio::test]
    async fn test_stats_empty() {
        let (_, _, messages) = fixture();
        let stats = messages.stats().await.unwrap();

        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            serde_json::json!({
                "total": 0,
                "unread": 0,
                "lastMessageDate": null,
                "last7days": 0,
                "last30days": 0,
            })
        );
    }

    #[tokio::test]
    async fn test_stats_time_windows() {
        let (store, _, messages) = fixture();
        let now = Utc::now();
        let backdated = [("recent", 2, false), ("older", 8, true), ("stale", 40, false)];
        for (id, days_ago, read) in backdated {
            store
                .insert_message(Message {
                    id: id.to_string(),
                    name: "Visitor".to_string(),
                    email: "visitor@example.com".to_string(),
                    message: "Hello".to_string(),
                    created_at: now - chrono::Duration::days(days_ago),
                    read,
                })
                .await;
        }

        let stats = messages.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.unread, 2);
        assert_eq!(stats.last_7_days, 1);
        assert_eq!(stats.last_30_days, 2);
        assert_eq!(stats.last_message_date, Some(now - chrono::Duration::days(2)));
        assert_eq!(messages.list_all().await.unwrap()[0].id, "recent");
    }

    #[tokio::test]
    async fn test_list_and_stats_cached() {
        let (store, _, messages) = fixture();
        messages.create(&submission("Ada")).await.unwrap();

        let first = messages.list_all().await.unwrap();
        let second = messages.list_all().await.unwrap();
        messages.stats().await.unwrap();
        messages.stats().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.message_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_invalidates_list_and_stats() {
        let (_, cache, messages) = fixture();
        assert_eq!(messages.stats().await.unwrap().total, 0);
        assert!(cache.get(&CacheKey::MessagesAll).await.is_some());

        let created = messages.create(&submission("Ada")).await.unwrap();
        assert_eq!(created.email, "visitor@example.com");
        assert!(cache.get(&CacheKey::MessagesAll).await.is_none());
        assert!(cache.get(&CacheKey::MessageStats).await.is_none());

        let stats = messages.stats().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.unread, 1);
        assert_eq!(stats.last_7_days, 1);
        assert_eq!(stats.last_message_date, Some(created.created_at));
    }

    #[tokio::test]
    async fn test_mark_read_persists_and_refreshes_stats() {
        let (store, _, messages) = fixture();
        let created = messages.create(&submission("Ada")).await.unwrap();
        assert_eq!(messages.stats().await.unwrap().unread, 1);

        let updated = messages.mark_read(&created.id).await.unwrap().unwrap();
        assert!(updated.read);
        assert!(store.get_message(&created.id).await.unwrap().unwrap().read);

        assert_eq!(messages.stats().await.unwrap().unread, 0);
        assert!(messages.list_all().await.unwrap()[0].read);
    }

    #[tokio::test]
    async fn test_mark_read_unknown_id() {
        let (_, cache, messages) = fixture();
        messages.stats().await.unwrap();

        assert!(messages.mark_read("missing").await.unwrap().is_none());
        assert!(cache.get(&CacheKey::MessageStats).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_invalidates_list() {
        let (_, _, messages) = fixture();
        let created = messages.create(&submission("Ada")).await.unwrap();
        assert_eq!(messages.list_all().await.unwrap().len(), 1);

        assert!(messages.delete(&created.id).await.unwrap());
        assert!(messages.list_all().await.unwrap().is_empty());
        assert!(!messages.delete(&created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_list_surfaces_error() {
        let (store, cache, messages) = fixture();
        store.set_fail_reads(true);

        assert!(matches!(
            messages.list_all().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(messages.stats().await.is_err());
        assert!(cache.get(&CacheKey::MessagesAll).await.is_none());
        assert!(cache.get(&CacheKey::MessageStats).await.is_none());
    }

    #[tokio::test]
    async fn test_timeline_writes_leave_message_cache_alone() {
        let (store, cache, messages) = fixture();
        let timeline = crate::cache::TimelineCache::new(store.clone(), cache.clone());
        messages.list_all().await.unwrap();

        timeline
            .create(&folio_db::TimelineParams {
                date: Utc::now(),
                title: "Shipped v1".to_string(),
                description: String::new(),
                attachment: None,
            })
            .await
            .unwrap();

        assert!(cache.get(&CacheKey::MessagesAll).await.is_some());
    }
}
