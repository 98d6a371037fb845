//! File-system blob store
//!
//! Blobs live in named containers (one directory each). Names are derived
//! from the SHA-256 of the content plus the original file extension, so the
//! same upload always lands on the same name. A JSON sidecar next to each blob
//! records its content type and original file name.

mod error;
mod store;
mod types;

pub use error::{BlobStoreError, Result};
pub use store::BlobStore;
pub use types::{Blob, BlobMeta, StoredBlob};
