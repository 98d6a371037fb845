//! Error types for the blob store

use std::fmt;

#[derive(Debug)]
pub enum BlobStoreError {
    Io(Box<std::io::Error>),
    /// Container or blob name rejected before touching the disk
    InvalidName(String),
    Serialization(serde_json::Error),
}

impl fmt::Display for BlobStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobStoreError::Io(err) => write!(f, "IO error: {}", err),
            BlobStoreError::InvalidName(name) => write!(f, "Invalid blob name: {}", name),
            BlobStoreError::Serialization(err) => write!(f, "Metadata error: {}", err),
        }
    }
}

impl std::error::Error for BlobStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobStoreError::Io(err) => Some(err.as_ref()),
            BlobStoreError::Serialization(err) => Some(err),
            BlobStoreError::InvalidName(_) => None,
        }
    }
}

impl From<std::io::Error> for BlobStoreError {
    fn from(err: std::io::Error) -> Self {
        BlobStoreError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for BlobStoreError {
    fn from(err: serde_json::Error) -> Self {
        BlobStoreError::Serialization(err)
    }
}

pub type Result<T> = std::result::Result<T, BlobStoreError>;
