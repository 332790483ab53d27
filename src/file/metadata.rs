//! File metadata types and repository.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::storage::object_key;
use crate::{CloudError, Result};

/// Metadata for an uploaded file.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FileRecord {
    /// Store-assigned file ID.
    pub id: i64,
    /// Original filename (display name).
    pub name: String,
    /// Blob name (UUID.ext); the object lives at `public/<image_name>`.
    pub image_name: String,
    /// Owner email.
    pub created_by: String,
    /// Folder the file belongs to (0 for root).
    pub parent_folder_id: i64,
    /// Whether the owner starred the file.
    pub is_starred: bool,
    /// When the file was uploaded.
    pub created_date: DateTime<Utc>,
    /// File size in bytes.
    pub size: i64,
}

impl FileRecord {
    /// Blob store key of this file's bytes.
    pub fn object_key(&self) -> String {
        object_key(&self.image_name)
    }
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Original filename.
    pub name: String,
    /// Blob name.
    pub image_name: String,
    /// Owner email.
    pub created_by: String,
    /// Folder the file belongs to.
    pub parent_folder_id: i64,
    /// File size in bytes.
    pub size: i64,
}

impl NewFile {
    /// Create a new NewFile.
    pub fn new(
        name: impl Into<String>,
        image_name: impl Into<String>,
        created_by: impl Into<String>,
        parent_folder_id: i64,
        size: i64,
    ) -> Self {
        Self {
            name: name.into(),
            image_name: image_name.into(),
            created_by: created_by.into(),
            parent_folder_id,
            size,
        }
    }
}

/// Equality filters for listing an owner's files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileFilter {
    /// Only files in this folder.
    pub parent_folder_id: Option<i64>,
    /// Only files with this starred flag.
    pub is_starred: Option<bool>,
}

impl FileFilter {
    /// No filter: every file of the owner.
    pub fn all() -> Self {
        Self::default()
    }

    /// Files directly inside a folder.
    pub fn in_folder(parent_folder_id: i64) -> Self {
        Self {
            parent_folder_id: Some(parent_folder_id),
            is_starred: None,
        }
    }

    /// Starred files, in any folder.
    pub fn starred() -> Self {
        Self {
            parent_folder_id: None,
            is_starred: Some(true),
        }
    }

    /// Whether a record satisfies this filter (owner is checked separately).
    pub fn matches(&self, file: &FileRecord) -> bool {
        self.parent_folder_id
            .map_or(true, |id| file.parent_folder_id == id)
            && self.is_starred.map_or(true, |s| file.is_starred == s)
    }
}

/// Sort records newest first, the order every list view displays.
pub fn sort_newest_first(files: &mut [FileRecord]) {
    files.sort_by(|a, b| {
        b.created_date
            .cmp(&a.created_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, image_name, created_by, parent_folder_id, is_starred, created_date, size FROM files";

/// Repository for file metadata records.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a file record.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        let created = sqlx::query_as::<_, FileRecord>(
            "INSERT INTO files (name, image_name, created_by, parent_folder_id, is_starred, created_date, size)
             VALUES (?, ?, ?, ?, 0, ?, ?)
             RETURNING id, name, image_name, created_by, parent_folder_id, is_starred, created_date, size",
        )
        .bind(&file.name)
        .bind(&file.image_name)
        .bind(&file.created_by)
        .bind(file.parent_folder_id)
        .bind(Utc::now())
        .bind(file.size)
        .fetch_one(self.pool)
        .await
        .map_err(|e| CloudError::Write(e.to_string()))?;

        Ok(created)
    }

    /// Get a file by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| CloudError::Query(e.to_string()))?;

        Ok(file)
    }

    /// Get a file by ID if it belongs to `owner`.
    pub async fn get_owned(&self, owner: &str, id: i64) -> Result<Option<FileRecord>> {
        Ok(self
            .get_by_id(id)
            .await?
            .filter(|file| file.created_by == owner))
    }

    /// List an owner's files matching a filter, in store order.
    pub async fn list(&self, owner: &str, filter: &FileFilter) -> Result<Vec<FileRecord>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COLUMNS);
        query.push(" WHERE created_by = ");
        query.push_bind(owner);

        if let Some(parent_folder_id) = filter.parent_folder_id {
            query.push(" AND parent_folder_id = ");
            query.push_bind(parent_folder_id);
        }

        if let Some(is_starred) = filter.is_starred {
            query.push(" AND is_starred = ");
            query.push_bind(is_starred);
        }

        let files = query
            .build_query_as::<FileRecord>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| CloudError::Query(e.to_string()))?;

        Ok(files)
    }

    /// Set the starred flag. Returns `false` if the record does not exist.
    pub async fn set_starred(&self, id: i64, is_starred: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE files SET is_starred = ? WHERE id = ?")
            .bind(is_starred)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| CloudError::Write(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a file record by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| CloudError::Write(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Total size in bytes of an owner's files.
    pub async fn total_size_by_owner(&self, owner: &str) -> Result<i64> {
        let (size,): (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(size), 0) FROM files WHERE created_by = ?")
                .bind(owner)
                .fetch_one(self.pool)
                .await
                .map_err(|e| CloudError::Query(e.to_string()))?;

        Ok(size)
    }

    /// Whether any record references this blob name.
    pub async fn image_name_exists(&self, image_name: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM files WHERE image_name = ?)")
                .bind(image_name)
                .fetch_one(self.pool)
                .await
                .map_err(|e| CloudError::Query(e.to_string()))?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    const OWNER: &str = "ada@example.com";

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn create_file(repo: &FileRepository<'_>, owner: &str, folder: i64, size: i64) -> FileRecord {
        let image_name = format!("{}.txt", uuid::Uuid::new_v4());
        repo.create(&NewFile::new("notes.txt", image_name, owner, folder, size))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_file() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let file = repo
            .create(&NewFile::new("report.pdf", "abc.pdf", OWNER, 0, 2048))
            .await
            .unwrap();

        assert!(file.id > 0);
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.image_name, "abc.pdf");
        assert_eq!(file.created_by, OWNER);
        assert_eq!(file.parent_folder_id, 0);
        assert!(!file.is_starred);
        assert_eq!(file.size, 2048);
        assert_eq!(file.object_key(), "public/abc.pdf");
    }

    #[tokio::test]
    async fn test_duplicate_image_name_is_write_error() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        repo.create(&NewFile::new("a", "same.bin", OWNER, 0, 1))
            .await
            .unwrap();
        let result = repo.create(&NewFile::new("b", "same.bin", OWNER, 0, 1)).await;

        assert!(matches!(result, Err(CloudError::Write(_))));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        let root_file = create_file(&repo, OWNER, 0, 10).await;
        let nested = create_file(&repo, OWNER, 5, 20).await;
        create_file(&repo, "eve@example.com", 0, 30).await;
        repo.set_starred(nested.id, true).await.unwrap();

        let all = repo.list(OWNER, &FileFilter::all()).await.unwrap();
        assert_eq!(all.len(), 2);

        let in_root = repo.list(OWNER, &FileFilter::in_folder(0)).await.unwrap();
        assert_eq!(in_root.len(), 1);
        assert_eq!(in_root[0].id, root_file.id);

        let starred = repo.list(OWNER, &FileFilter::starred()).await.unwrap();
        assert_eq!(starred.len(), 1);
        assert_eq!(starred[0].id, nested.id);
        assert!(starred.iter().all(|f| f.created_by == OWNER && f.is_starred));
    }

    #[tokio::test]
    async fn test_set_starred_missing() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        assert!(!repo.set_starred(404, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());
        let file = create_file(&repo, OWNER, 0, 10).await;

        assert!(repo.delete(file.id).await.unwrap());
        assert!(repo.get_by_id(file.id).await.unwrap().is_none());
        assert!(!repo.delete(file.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_total_size_by_owner() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());

        assert_eq!(repo.total_size_by_owner(OWNER).await.unwrap(), 0);

        create_file(&repo, OWNER, 0, 100).await;
        create_file(&repo, OWNER, 3, 250).await;
        create_file(&repo, "eve@example.com", 0, 1000).await;

        assert_eq!(repo.total_size_by_owner(OWNER).await.unwrap(), 350);
    }

    #[tokio::test]
    async fn test_image_name_exists() {
        let db = setup_db().await;
        let repo = FileRepository::new(db.pool());
        let file = create_file(&repo, OWNER, 0, 1).await;

        assert!(repo.image_name_exists(&file.image_name).await.unwrap());
        assert!(!repo.image_name_exists("nope.bin").await.unwrap());
    }

    #[test]
    fn test_filter_matches() {
        let file = FileRecord {
            id: 1,
            name: "a".to_string(),
            image_name: "a.bin".to_string(),
            created_by: OWNER.to_string(),
            parent_folder_id: 3,
            is_starred: true,
            created_date: Utc::now(),
            size: 1,
        };

        assert!(FileFilter::all().matches(&file));
        assert!(FileFilter::starred().matches(&file));
        assert!(FileFilter::in_folder(3).matches(&file));
        assert!(!FileFilter::in_folder(0).matches(&file));
    }

    #[test]
    fn test_sort_newest_first() {
        let base = Utc::now();
        let make = |id: i64, secs: i64| FileRecord {
            id,
            name: format!("f{id}"),
            image_name: format!("{id}.bin"),
            created_by: OWNER.to_string(),
            parent_folder_id: 0,
            is_starred: false,
            created_date: base + chrono::Duration::seconds(secs),
            size: 0,
        };

        let mut files = vec![make(1, 0), make(2, 30), make(3, 10), make(4, 30)];
        sort_newest_first(&mut files);

        let ids: Vec<_> = files.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }
}
