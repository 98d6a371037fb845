//! Document store contract and its Postgres implementation

use crate::types::{CreateMessageParams, Message, TimelineItem, TimelineParams};
use crate::{messages, timeline};
use async_trait::async_trait;
use sqlx::PgPool;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Migration(String),
    /// Store could not be reached or refused the call
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {e}"),
            Self::Migration(msg) => write!(f, "Migration error: {msg}"),
            Self::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

/// Authoritative storage for timeline items and visitor messages.
///
/// Lists come back ordered: timeline items by date descending, messages by
/// receipt time descending. Implementations do no caching.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_timeline(&self) -> Result<Vec<TimelineItem>, StoreError>;
    async fn get_timeline(&self, id: &str) -> Result<Option<TimelineItem>, StoreError>;
    async fn create_timeline(&self, params: &TimelineParams) -> Result<TimelineItem, StoreError>;
    async fn update_timeline(
        &self,
        id: &str,
        params: &TimelineParams,
    ) -> Result<Option<TimelineItem>, StoreError>;
    async fn delete_timeline(&self, id: &str) -> Result<bool, StoreError>;

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError>;
    async fn get_message(&self, id: &str) -> Result<Option<Message>, StoreError>;
    async fn create_message(&self, params: &CreateMessageParams) -> Result<Message, StoreError>;
    /// Partial update touching only the read flag
    async fn set_message_read(&self, id: &str, read: bool) -> Result<Option<Message>, StoreError>;
    async fn delete_message(&self, id: &str) -> Result<bool, StoreError>;
}

/// Postgres-backed document store
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list_timeline(&self) -> Result<Vec<TimelineItem>, StoreError> {
        Ok(timeline::list(&self.pool).await?)
    }

    async fn get_timeline(&self, id: &str) -> Result<Option<TimelineItem>, StoreError> {
        Ok(timeline::get(&self.pool, id).await?)
    }

    async fn create_timeline(&self, params: &TimelineParams) -> Result<TimelineItem, StoreError> {
        Ok(timeline::create(&self.pool, params).await?)
    }

    async fn update_timeline(
        &self,
        id: &str,
        params: &TimelineParams,
    ) -> Result<Option<TimelineItem>, StoreError> {
        Ok(timeline::update(&self.pool, id, params).await?)
    }

    async fn delete_timeline(&self, id: &str) -> Result<bool, StoreError> {
        Ok(timeline::delete(&self.pool, id).await?)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        Ok(messages::list(&self.pool).await?)
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>, StoreError> {
        Ok(messages::get(&self.pool, id).await?)
    }

    async fn create_message(&self, params: &CreateMessageParams) -> Result<Message, StoreError> {
        Ok(messages::create(&self.pool, params).await?)
    }

    async fn set_message_read(&self, id: &str, read: bool) -> Result<Option<Message>, StoreError> {
        Ok(messages::set_read(&self.pool, id, read).await?)
    }

    async fn delete_message(&self, id: &str) -> Result<bool, StoreError> {
        Ok(messages::delete(&self.pool, id).await?)
    }
}
