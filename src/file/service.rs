//! Folder and file services.
//!
//! These orchestrate the metadata store and the blob store:
//! - Folder creation with parent ownership checks
//! - Upload (blob first, then metadata) with name and size checks
//! - Starring and the two-step, non-atomic delete
//! - Storage usage and the orphan sweep that cleans up after partial failures

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::db::Database;
use crate::storage::{generate_image_name, object_key, BlobStore, PUBLIC_PREFIX};
use crate::{CloudError, Result};

use super::folder::{Folder, FolderRepository, NewFolder};
use super::metadata::{FileFilter, FileRecord, FileRepository, NewFile};
use super::{DEFAULT_MAX_UPLOAD_SIZE, MAX_FOLDER_DEPTH, MAX_NAME_LENGTH, ROOT_FOLDER_ID};

/// Trim and check a file or folder name.
fn validate_name(name: &str, what: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(CloudError::Validation(format!("{what} name is required")));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CloudError::Validation(format!(
            "{what} name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(CloudError::Validation(format!(
            "{what} name contains control characters"
        )));
    }

    Ok(name.to_string())
}

/// Check that a non-root parent folder exists and belongs to `owner`.
async fn check_parent(db: &Database, owner: &str, parent_folder_id: i64) -> Result<()> {
    if parent_folder_id == ROOT_FOLDER_ID {
        return Ok(());
    }

    FolderRepository::new(db.pool())
        .get_owned(owner, parent_folder_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| CloudError::NotFound("folder".to_string()))
}

/// Folder operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    db: Database,
}

impl FolderService {
    /// Create a new FolderService.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a folder under `parent_folder_id` (0 for root).
    pub async fn create_folder(
        &self,
        name: &str,
        parent_folder_id: i64,
        owner: &str,
    ) -> Result<Folder> {
        let name = validate_name(name, "folder")?;
        check_parent(&self.db, owner, parent_folder_id).await?;

        let folder = FolderRepository::new(self.db.pool())
            .create(&NewFolder::new(name, owner).with_parent(parent_folder_id))
            .await?;

        info!(
            folder_id = folder.id,
            parent_folder_id, owner, "Folder created"
        );
        Ok(folder)
    }

    /// List the owner's folders directly under a parent, in store order.
    pub async fn list_folders(&self, owner: &str, parent_folder_id: i64) -> Result<Vec<Folder>> {
        FolderRepository::new(self.db.pool())
            .list_by_parent(owner, parent_folder_id)
            .await
    }

    /// Get one of the owner's folders.
    pub async fn get_folder(&self, owner: &str, id: i64) -> Result<Folder> {
        FolderRepository::new(self.db.pool())
            .get_owned(owner, id)
            .await?
            .ok_or_else(|| CloudError::NotFound("folder".to_string()))
    }

    /// Breadcrumb from the root down to one of the owner's folders.
    pub async fn folder_path(&self, owner: &str, id: i64) -> Result<Vec<Folder>> {
        self.get_folder(owner, id).await?;

        let path = FolderRepository::new(self.db.pool())
            .get_path(id, MAX_FOLDER_DEPTH)
            .await?;

        Ok(path
            .into_iter()
            .filter(|folder| folder.created_by == owner)
            .collect())
    }
}

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
    /// Folder to upload into (0 for root).
    pub parent_folder_id: i64,
}

impl UploadRequest {
    /// Create an upload request for the root folder.
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
            parent_folder_id: ROOT_FOLDER_ID,
        }
    }

    /// Set the destination folder.
    pub fn in_folder(mut self, parent_folder_id: i64) -> Self {
        self.parent_folder_id = parent_folder_id;
        self
    }
}

/// File operations across the metadata store and the blob store.
#[derive(Clone)]
pub struct FileService {
    db: Database,
    blobs: Arc<dyn BlobStore>,
    max_upload_size: u64,
    /// Keys whose blob is written but whose metadata record may not be yet.
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl FileService {
    /// Create a new FileService.
    pub fn new(db: Database, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            db,
            blobs,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, max_size: u64) -> Self {
        self.max_upload_size = max_size;
        self
    }

    /// The configured maximum upload size in bytes.
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    fn track(&self, key: &str, in_flight: bool) {
        let mut keys = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if in_flight {
            keys.insert(key.to_string());
        } else {
            keys.remove(key);
        }
    }

    fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }

    /// Upload a file: write the blob, then the metadata record.
    ///
    /// If the metadata write fails the blob is not rolled back. It stays
    /// as an orphan until [`FileService::sweep_orphaned_blobs`] runs.
    pub async fn upload_file(&self, request: UploadRequest, owner: &str) -> Result<FileRecord> {
        let name = validate_name(&request.name, "file")?;

        if request.content.len() as u64 > self.max_upload_size {
            return Err(CloudError::FileTooLarge {
                max_bytes: self.max_upload_size,
            });
        }

        check_parent(&self.db, owner, request.parent_folder_id).await?;

        let image_name = generate_image_name(&name);
        let key = object_key(&image_name);

        self.track(&key, true);
        if let Err(e) = self.blobs.put(&key, &request.content).await {
            self.track(&key, false);
            return Err(e);
        }

        let new_file = NewFile::new(
            name,
            image_name,
            owner,
            request.parent_folder_id,
            request.content.len() as i64,
        );
        let created = FileRepository::new(self.db.pool()).create(&new_file).await;
        self.track(&key, false);

        match created {
            Ok(file) => {
                info!(file_id = file.id, size = file.size, owner, "File uploaded");
                Ok(file)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Metadata write failed after blob upload; blob left orphaned");
                Err(e)
            }
        }
    }

    /// List the owner's files matching a filter, in store order.
    pub async fn list_files(&self, owner: &str, filter: &FileFilter) -> Result<Vec<FileRecord>> {
        FileRepository::new(self.db.pool()).list(owner, filter).await
    }

    /// Get one of the owner's files.
    pub async fn get_file(&self, owner: &str, id: i64) -> Result<FileRecord> {
        FileRepository::new(self.db.pool())
            .get_owned(owner, id)
            .await?
            .ok_or_else(|| CloudError::NotFound("file".to_string()))
    }

    /// Get one of the owner's files together with its bytes.
    pub async fn read_content(&self, owner: &str, id: i64) -> Result<(FileRecord, Vec<u8>)> {
        let file = self.get_file(owner, id).await?;
        let content = self.blobs.get(&file.object_key()).await?;
        Ok((file, content))
    }

    /// Set the starred flag. Setting the current value again is a no-op.
    pub async fn toggle_star(&self, owner: &str, id: i64, is_starred: bool) -> Result<FileRecord> {
        let mut file = self.get_file(owner, id).await?;

        if !FileRepository::new(self.db.pool())
            .set_starred(id, is_starred)
            .await?
        {
            return Err(CloudError::NotFound("file".to_string()));
        }

        debug!(file_id = id, is_starred, "File star updated");
        file.is_starred = is_starred;
        Ok(file)
    }

    /// Delete a file: metadata record first, then the blob.
    ///
    /// The two steps are not atomic. When blob removal fails the record is
    /// already gone and `PartialDelete` is returned. A blob that is already
    /// missing counts as removed.
    pub async fn delete_file(&self, owner: &str, id: i64) -> Result<FileRecord> {
        let file = self.get_file(owner, id).await?;

        if !FileRepository::new(self.db.pool()).delete(id).await? {
            return Err(CloudError::NotFound("file".to_string()));
        }

        let key = file.object_key();
        match self.blobs.remove(&key).await {
            Ok(true) => {}
            Ok(false) => debug!(key = %key, "Blob already missing on delete"),
            Err(e) => {
                warn!(file_id = id, key = %key, error = %e, "Blob removal failed after metadata delete");
                return Err(CloudError::PartialDelete {
                    file_id: id,
                    key,
                    reason: e.to_string(),
                });
            }
        }

        info!(file_id = id, owner, "File deleted");
        Ok(file)
    }

    /// Total bytes of the owner's files.
    pub async fn compute_used_storage(&self, owner: &str) -> Result<u64> {
        let total = FileRepository::new(self.db.pool())
            .total_size_by_owner(owner)
            .await?;
        Ok(total.max(0) as u64)
    }

    /// Remove `public/` blobs that no metadata record references.
    ///
    /// Returns the removed keys. Blobs of uploads still in progress are skipped.
    pub async fn sweep_orphaned_blobs(&self) -> Result<Vec<String>> {
        let repo = FileRepository::new(self.db.pool());
        let mut removed = Vec::new();

        for key in self.blobs.list(PUBLIC_PREFIX).await? {
            let Some(image_name) = key.strip_prefix(PUBLIC_PREFIX) else {
                continue;
            };
            if self.is_in_flight(&key) || repo.image_name_exists(image_name).await? {
                continue;
            }

            match self.blobs.remove(&key).await {
                Ok(_) => removed.push(key),
                Err(e) => warn!(key = %key, error = %e, "Failed to remove orphaned blob"),
            }
        }

        if !removed.is_empty() {
            info!(count = removed.len(), "Removed orphaned blobs");
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("blobs", &self.blobs.backend_name())
            .field("max_upload_size", &self.max_upload_size)
            .finish()
    }
}
