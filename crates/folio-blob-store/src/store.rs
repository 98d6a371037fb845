//! Blob storage on the local file system

use crate::error::{BlobStoreError, Result};
use crate::types::{Blob, BlobMeta, StoredBlob};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 10;
const ID_LEN: usize = 32;

/// Blob store rooted at a directory, one sub-directory per container
pub struct BlobStore {
    root: PathBuf,
    containers: Vec<String>,
    public_base_url: String,
}

impl BlobStore {
    /// Create a store serving `containers` under `public_base_url/files/...`
    pub fn new(root: PathBuf, public_base_url: &str, containers: &[&str]) -> Self {
        Self {
            root,
            containers: containers.iter().map(|c| c.to_string()).collect(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Make sure every container directory exists
    pub async fn init(&self) -> Result<()> {
        for container in &self.containers {
            fs::create_dir_all(self.root.join(container)).await?;
        }
        info!(root = ?self.root, containers = ?self.containers, "Blob store initialized");
        Ok(())
    }

    /// Fresh blob name: a random UUID in simple form plus the lower-cased extension.
    ///
    /// Every upload gets its own name, so identical files attached to two
    /// records are stored twice and can be deleted independently.
    pub fn blob_name(original_name: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();

        match extension(original_name) {
            Some(ext) => format!("{}.{}", id, ext),
            None => id,
        }
    }

    /// Public URL for a blob
    pub fn url_for(&self, container: &str, name: &str) -> String {
        format!("{}/files/{}/{}", self.public_base_url, container, name)
    }

    /// Store `data` in `container`, returning where it can be fetched from
    pub async fn upload(
        &self,
        container: &str,
        original_name: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredBlob> {
        self.check_container(container)?;
        let name = Self::blob_name(original_name);
        let path = self.root.join(container).join(&name);

        let meta = BlobMeta {
            content_type: content_type.to_string(),
            original_name: original_name.to_string(),
            size: data.len() as u64,
            created_at: Utc::now(),
        };

        fs::write(&path, data).await?;
        fs::write(meta_path(&path), serde_json::to_vec(&meta)?).await?;
        debug!(container, name = %name, size = meta.size, "Stored blob");

        Ok(StoredBlob {
            container: container.to_string(),
            url: self.url_for(container, &name),
            name,
            size: meta.size,
        })
    }

    /// Read a blob and its metadata, `None` if it does not exist
    pub async fn download(&self, container: &str, name: &str) -> Result<Option<Blob>> {
        let path = self.blob_path(container, name)?;

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let meta = match fs::read(meta_path(&path)).await {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(container, name, "Blob has no metadata, serving as octet-stream");
                BlobMeta {
                    content_type: "application/octet-stream".to_string(),
                    original_name: name.to_string(),
                    size: data.len() as u64,
                    created_at: Utc::now(),
                }
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(Blob { data, meta }))
    }

    /// Remove a blob, returning whether it existed
    pub async fn delete(&self, container: &str, name: &str) -> Result<bool> {
        let path = self.blob_path(container, name)?;

        let removed = match fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        // Ignore errors, the sidecar is useless without its blob
        let _ = fs::remove_file(meta_path(&path)).await;

        if removed {
            debug!(container, name, "Deleted blob");
        }
        Ok(removed)
    }

    fn check_container(&self, container: &str) -> Result<()> {
        if self.containers.iter().any(|c| c == container) {
            Ok(())
        } else {
            Err(BlobStoreError::InvalidName(container.to_string()))
        }
    }

    fn blob_path(&self, container: &str, name: &str) -> Result<PathBuf> {
        self.check_container(container)?;
        if !is_valid_blob_name(name) {
            return Err(BlobStoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(container).join(name))
    }
}

fn meta_path(path: &std::path::Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".meta.json");
    PathBuf::from(os)
}

fn extension(original_name: &str) -> Option<String> {
    let (_, ext) = original_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

/// Only names produced by `BlobStore::blob_name` are accepted
fn is_valid_blob_name(name: &str) -> bool {
    let (id, ext) = match name.split_once('.') {
        Some((id, ext)) => (id, Some(ext)),
        None => (name, None),
    };

    let id_ok = id.len() == ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    let ext_ok = ext.map_or(true, |ext| {
        !ext.is_empty()
            && ext.len() <= MAX_EXTENSION_LEN
            && ext
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    });

    id_ok && ext_ok
}
