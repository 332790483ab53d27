//! Folder types and repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::ROOT_FOLDER_ID;
use crate::{CloudError, Result};

/// A folder owned by one user.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Folder {
    /// Store-assigned folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Owner email.
    pub created_by: String,
    /// Parent folder ID (0 for root folders).
    pub parent_folder_id: i64,
    /// When the folder was created.
    pub created_date: DateTime<Utc>,
}

impl Folder {
    /// Whether this is a top-level folder.
    pub fn is_root(&self) -> bool {
        self.parent_folder_id == ROOT_FOLDER_ID
    }
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Folder name.
    pub name: String,
    /// Owner email.
    pub created_by: String,
    /// Parent folder ID (0 for root folders).
    pub parent_folder_id: i64,
}

impl NewFolder {
    /// Create a new root folder for `created_by`.
    pub fn new(name: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_by: created_by.into(),
            parent_folder_id: ROOT_FOLDER_ID,
        }
    }

    /// Set the parent folder.
    pub fn with_parent(mut self, parent_folder_id: i64) -> Self {
        self.parent_folder_id = parent_folder_id;
        self
    }
}

/// Repository for folder records.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a folder and return the stored record.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let created = sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (name, created_by, parent_folder_id, created_date)
             VALUES (?, ?, ?, ?)
             RETURNING id, name, created_by, parent_folder_id, created_date",
        )
        .bind(&folder.name)
        .bind(&folder.created_by)
        .bind(folder.parent_folder_id)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| CloudError::Write(e.to_string()))?;

        Ok(created)
    }

    /// Get a folder by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, name, created_by, parent_folder_id, created_date
             FROM folders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CloudError::Query(e.to_string()))?;

        Ok(folder)
    }

    /// Get a folder by ID if it belongs to `owner`.
    pub async fn get_owned(&self, owner: &str, id: i64) -> Result<Option<Folder>> {
        Ok(self
            .get_by_id(id)
            .await?
            .filter(|folder| folder.created_by == owner))
    }

    /// List an owner's folders under a parent.
    ///
    /// Order is whatever the store returns; callers sort by `created_date`.
    pub async fn list_by_parent(&self, owner: &str, parent_folder_id: i64) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, created_by, parent_folder_id, created_date
             FROM folders WHERE created_by = ? AND parent_folder_id = ?",
        )
        .bind(owner)
        .bind(parent_folder_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| CloudError::Query(e.to_string()))?;

        Ok(folders)
    }

    /// Get the path from the root down to a folder.
    ///
    /// Stops at a missing parent, or after `max_depth` hops so a corrupted
    /// parent cycle cannot loop forever.
    pub async fn get_path(&self, id: i64, max_depth: usize) -> Result<Vec<Folder>> {
        let mut path = Vec::new();
        let mut current_id = id;

        while current_id != ROOT_FOLDER_ID && path.len() < max_depth {
            match self.get_by_id(current_id).await? {
                Some(folder) => {
                    current_id = folder.parent_folder_id;
                    path.push(folder);
                }
                None => break,
            }
        }

        path.reverse();
        Ok(path)
    }
}
