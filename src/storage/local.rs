//! Local-directory bucket.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{validate_key, BlobStore};
use crate::{CloudError, Result};

/// Bucket backed by a directory on the local filesystem.
///
/// Object keys map directly onto relative paths:
/// ```text
/// {base_path}/
/// └── public/
///     ├── 0b5e0c4e-2f7a-4a55-8a83-5d2f3f7f4a10.pdf
///     └── 9d1c2a34-7b6e-4f0d-9e21-3c4b5a6d7e8f.png
/// ```
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Root directory of the bucket.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CloudError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        fs::write(&path, content)
            .await
            .map_err(|e| CloudError::Storage(format!("write {key}: {e}")))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key)?;
        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CloudError::NotFound(format!("object {key}")))
            }
            Err(e) => Err(CloudError::Storage(format!("read {key}: {e}"))),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CloudError::Storage(format!("remove {key}: {e}"))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.object_path(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| CloudError::Storage(format!("stat {key}: {e}")))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        // Prefixes are directory-shaped ("public/"); only that directory is scanned.
        let dir_part = match prefix.rfind('/') {
            Some(idx) => &prefix[..idx],
            None => "",
        };
        let dir = self.base_path.join(dir_part);

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(CloudError::Storage(format!("list {prefix}: {e}"))),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CloudError::Storage(format!("list {prefix}: {e}")))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                let key = if dir_part.is_empty() {
                    name.to_string()
                } else {
                    format!("{dir_part}/{name}")
                };
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
