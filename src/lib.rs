//! cloudnest - a cloud file manager.
//!
//! Users sign in through an external session provider, organize uploads
//! into folders, star and delete files, and get a warning as their storage
//! nears its quota. File bytes live in a blob bucket; folder and file
//! records live in a SQLite metadata store.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod session;
pub mod storage;
pub mod web;

pub use app::{CloudApp, ListPage, NavShell, PageEffect, PageKind, Workspace};
pub use config::Config;
pub use db::Database;
pub use error::{CloudError, Result};
pub use file::{
    FileFilter, FileRecord, FileService, Folder, FolderService, QuotaPolicy, StorageUsage,
    UploadRequest,
};
pub use session::{Session, SessionProvider, SessionStatus};
pub use storage::{open_blob_store, BlobStore, LocalBlobStore, MemoryBlobStore};
pub use web::WebServer;
