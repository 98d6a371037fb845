//! In-process document store
//!
//! Keeps records in memory with the same ordering rules as Postgres. Counts
//! list calls and can be told to fail, which makes cache behaviour observable
//! in tests without a database.

use crate::store::{DocumentStore, StoreError};
use crate::types::{CreateMessageParams, Message, TimelineItem, TimelineParams};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryDocumentStore {
    timeline: RwLock<Vec<TimelineItem>>,
    messages: RwLock<Vec<Message>>,
    timeline_list_calls: AtomicU64,
    message_list_calls: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `list_timeline` calls served so far
    pub fn timeline_list_calls(&self) -> u64 {
        self.timeline_list_calls.load(Ordering::SeqCst)
    }

    /// Number of `list_messages` calls served so far
    pub fn message_list_calls(&self) -> u64 {
        self.message_list_calls.load(Ordering::SeqCst)
    }

    /// Make every read return `StoreError::Unavailable`
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write return `StoreError::Unavailable`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a message as-is, keeping its ID and timestamp
    pub async fn insert_message(&self, message: Message) {
        self.messages.write().await.push(message);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_timeline(&self) -> Result<Vec<TimelineItem>, StoreError> {
        self.timeline_list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        let mut items = self.timeline.read().await.clone();
        items.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(items)
    }

    async fn get_timeline(&self, id: &str) -> Result<Option<TimelineItem>, StoreError> {
        self.check_read()?;
        let items = self.timeline.read().await;
        Ok(items.iter().find(|i| i.id == id).cloned())
    }

    async fn create_timeline(&self, params: &TimelineParams) -> Result<TimelineItem, StoreError> {
        self.check_write()?;
        let item = TimelineItem {
            id: Uuid::new_v4().to_string(),
            date: params.date,
            title: params.title.clone(),
            description: params.description.clone(),
            attachment: params.attachment.clone(),
            created_at: Utc::now(),
        };
        self.timeline.write().await.push(item.clone());
        Ok(item)
    }

    async fn update_timeline(
        &self,
        id: &str,
        params: &TimelineParams,
    ) -> Result<Option<TimelineItem>, StoreError> {
        self.check_write()?;
        let mut items = self.timeline.write().await;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        item.date = params.date;
        item.title = params.title.clone();
        item.description = params.description.clone();
        item.attachment = params.attachment.clone();
        Ok(Some(item.clone()))
    }

    async fn delete_timeline(&self, id: &str) -> Result<bool, StoreError> {
        self.check_write()?;
        let mut items = self.timeline.write().await;
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        self.message_list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        let mut messages = self.messages.read().await.clone();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>, StoreError> {
        self.check_read()?;
        let messages = self.messages.read().await;
        Ok(messages.iter().find(|m| m.id == id).cloned())
    }

    async fn create_message(&self, params: &CreateMessageParams) -> Result<Message, StoreError> {
        self.check_write()?;
        let message = Message {
            id: Uuid::new_v4().to_string(),
            name: params.name.clone(),
            email: params.email.clone(),
            message: params.message.clone(),
            created_at: Utc::now(),
            read: false,
        };
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn set_message_read(&self, id: &str, read: bool) -> Result<Option<Message>, StoreError> {
        self.check_write()?;
        let mut messages = self.messages.write().await;
        let Some(message) = messages.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        message.read = read;
        Ok(Some(message.clone()))
    }

    async fn delete_message(&self, id: &str) -> Result<bool, StoreError> {
        self.check_write()?;
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|m| m.id != id);
        Ok(messages.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn params(title: &str, y: i32, m: u32, d: u32) -> TimelineParams {
        TimelineParams {
            date: Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap(),
            title: title.to_string(),
            description: String::new(),
            attachment: None,
        }
    }

    #[tokio::test]
    async fn test_timeline_sorted_by_date_desc() {
        let store = MemoryDocumentStore::new();
        store.create_timeline(&params("old", 2020, 1, 1)).await.unwrap();
        store.create_timeline(&params("new", 2024, 1, 1)).await.unwrap();
        store.create_timeline(&params("mid", 2022, 1, 1)).await.unwrap();

        let titles: Vec<_> = store
            .list_timeline()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
        assert_eq!(store.timeline_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryDocumentStore::new();
        let updated = store
            .update_timeline("missing", &params("x", 2024, 1, 1))
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(!store.delete_timeline("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_message_read() {
        let store = MemoryDocumentStore::new();
        let created = store
            .create_message(&CreateMessageParams::new("Ada", "ada@example.com", "Hi"))
            .await
            .unwrap();
        assert!(!created.read);

        let updated = store.set_message_read(&created.id, true).await.unwrap().unwrap();
        assert!(updated.read);
        assert!(store.get_message(&created.id).await.unwrap().unwrap().read);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryDocumentStore::new();
        store.set_fail_reads(true);
        assert!(matches!(
            store.list_messages().await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_fail_writes(true);
        let result = store
            .create_message(&CreateMessageParams::new("Ada", "ada@example.com", "Hi"))
            .await;
        assert!(result.is_err());
    }
}
