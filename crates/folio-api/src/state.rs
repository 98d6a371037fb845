use folio_blob_store::BlobStore;
use folio_db::DocumentStore;
use std::sync::Arc;

use crate::cache::{MessageCache, ResponseCache, TimelineCache};

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub timeline: Arc<TimelineCache>,
    pub messages: Arc<MessageCache>,
    pub blobs: Arc<BlobStore>,
}

impl AppState {
    /// Wire both cache facades to the same store and response cache
    pub fn new(store: Arc<dyn DocumentStore>, cache: ResponseCache, blobs: BlobStore) -> Self {
        Self {
            timeline: Arc::new(TimelineCache::new(store.clone(), cache.clone())),
            messages: Arc::new(MessageCache::new(store, cache)),
            blobs: Arc::new(blobs),
        }
    }
}
