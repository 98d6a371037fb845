//! Blob store types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sidecar metadata stored next to each blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobMeta {
    pub content_type: String,
    pub original_name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Result of an upload
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub container: String,
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// Blob content read back from the store
#[derive(Debug, Clone)]
pub struct Blob {
    pub data: Vec<u8>,
    pub meta: BlobMeta,
}
