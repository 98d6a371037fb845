use super::{CacheKey, CachedValue, ResponseCache, TIMELINE_TTL};
use chrono::NaiveDate;
use folio_db::{DocumentStore, StoreError, TimelineItem, TimelineParams};
use std::sync::Arc;
use tracing::{debug, info};

/// Timeline reads and writes with a list cache and a per-date cache
pub struct TimelineCache {
    store: Arc<dyn DocumentStore>,
    cache: ResponseCache,
}

impl TimelineCache {
    pub fn new(store: Arc<dyn DocumentStore>, cache: ResponseCache) -> Self {
        Self { store, cache }
    }

    /// All items, newest date first
    pub async fn list_all(&self) -> Result<Arc<Vec<TimelineItem>>, StoreError> {
        if let Some(CachedValue::Timeline(items)) = self.cache.get(&CacheKey::TimelineAll).await {
            debug!(count = items.len(), "Timeline list cache hit");
            return Ok(items);
        }
        debug!("Timeline list cache miss");

        let items = Arc::new(self.store.list_timeline().await?);
        self.cache
            .set(
                CacheKey::TimelineAll,
                CachedValue::Timeline(items.clone()),
                TIMELINE_TTL,
            )
            .await;
        Ok(items)
    }

    /// First item whose calendar date is `date`.
    ///
    /// Misses are not cached, so a date with no item is rescanned every time.
    pub async fn get_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<Arc<TimelineItem>>, StoreError> {
        let key = CacheKey::TimelineByDate(date);
        if let Some(CachedValue::TimelineItem(item)) = self.cache.get(&key).await {
            debug!(%date, "Timeline date cache hit");
            return Ok(Some(item));
        }
        debug!(%date, "Timeline date cache miss");

        let items = self.list_all().await?;
        let Some(found) = items.iter().find(|item| item.day() == date) else {
            return Ok(None);
        };

        let item = Arc::new(found.clone());
        self.cache
            .set(key, CachedValue::TimelineItem(item.clone()), TIMELINE_TTL)
            .await;
        Ok(Some(item))
    }

    /// Direct lookup, never cached
    pub async fn get_by_id(&self, id: &str) -> Result<Option<TimelineItem>, StoreError> {
        self.store.get_timeline(id).await
    }

    pub async fn create(&self, params: &TimelineParams) -> Result<TimelineItem, StoreError> {
        let item = self.store.create_timeline(params).await?;
        self.invalidate(&[item.day()]).await;
        info!(id = %item.id, date = %item.day(), "Created timeline item");
        Ok(item)
    }

    /// Replace every field of `id`; `None` if it does not exist
    pub async fn update(
        &self,
        id: &str,
        params: &TimelineParams,
    ) -> Result<Option<TimelineItem>, StoreError> {
        let Some(previous) = self.store.get_timeline(id).await? else {
            return Ok(None);
        };

        let updated = self.store.update_timeline(id, params).await?;
        // The old date slot may still hold this record
        self.invalidate(&[previous.day(), params.day()]).await;

        if updated.is_some() {
            info!(id, date = %params.day(), "Updated timeline item");
        }
        Ok(updated)
    }

    /// Delete `id`, returning the removed item
    pub async fn delete(&self, id: &str) -> Result<Option<TimelineItem>, StoreError> {
        let Some(existing) = self.store.get_timeline(id).await? else {
            return Ok(None);
        };

        let removed = self.store.delete_timeline(id).await?;
        self.invalidate(&[existing.day()]).await;

        if removed {
            info!(id, date = %existing.day(), "Deleted timeline item");
        }
        Ok(removed.then_some(existing))
    }

    async fn invalidate(&self, dates: &[NaiveDate]) {
        self.cache.invalidate(&CacheKey::TimelineAll).await;
        for date in dates {
            self.cache.invalidate(&CacheKey::TimelineByDate(*date)).await;
        }
    }
}
