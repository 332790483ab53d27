//! Database schema and migrations for cloudnest.

/// Database migrations.
///
/// Each migration is a SQL script executed in order; `schema_version`
/// records which ones have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: folders and files
    r#"
-- Folders. parent_folder_id = 0 marks a root folder, so it carries no foreign key.
CREATE TABLE folders (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL,
    created_by          TEXT NOT NULL,
    parent_folder_id    INTEGER NOT NULL DEFAULT 0,
    created_date        TEXT NOT NULL
);

CREATE INDEX idx_folders_owner_parent ON folders(created_by, parent_folder_id);

-- File metadata. image_name is the blob key under public/.
CREATE TABLE files (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT NOT NULL,
    image_name          TEXT NOT NULL UNIQUE,
    created_by          TEXT NOT NULL,
    parent_folder_id    INTEGER NOT NULL DEFAULT 0,
    is_starred          INTEGER NOT NULL DEFAULT 0,
    created_date        TEXT NOT NULL,
    size                INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_files_owner_parent ON files(created_by, parent_folder_id);
CREATE INDEX idx_files_owner_starred ON files(created_by, is_starred);
"#,
];
