//! Blob store boundary.
//!
//! Uploaded bytes live in a bucket addressed by object key. Keys follow the
//! pattern `public/<image_name>`, where the image name is a UUID plus the
//! original file extension.

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{StorageBackend, StorageConfig};
use crate::{CloudError, Result};

/// Prefix under which every uploaded object is stored.
pub const PUBLIC_PREFIX: &str = "public/";

/// Object storage holding raw file bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short name of the backend, for logs.
    fn backend_name(&self) -> &'static str;

    /// Write an object, replacing any existing one with the same key.
    async fn put(&self, key: &str, content: &[u8]) -> Result<()>;

    /// Read an object. Missing objects are `NotFound`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Remove an object.
    ///
    /// Returns `false` if the object did not exist.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// List the keys that start with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Build the object key for an image name.
pub fn object_key(image_name: &str) -> String {
    format!("{PUBLIC_PREFIX}{image_name}")
}

/// Generate a fresh image name that keeps the extension of `original_name`.
///
/// Names without an extension get `bin`.
pub fn generate_image_name(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("bin");
    format!("{}.{ext}", Uuid::new_v4())
}

/// Reject keys that could escape the bucket or are otherwise malformed.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(CloudError::Validation(format!("invalid object key: {key:?}")));
    }
    Ok(())
}

/// Create the blob store selected by the configuration.
pub fn open_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.backend {
        StorageBackend::Local => Arc::new(LocalBlobStore::new(&config.bucket_path)?),
        StorageBackend::Memory => Arc::new(MemoryBlobStore::new()),
    };
    tracing::info!(backend = store.backend_name(), "Blob store ready");
    Ok(store)
}
