//! File management module for cloudnest.
//!
//! This module provides the folder and file lifecycle:
//! - Folder records with a parent-folder hierarchy (0 = root)
//! - File metadata records pointing at blob store objects
//! - Upload, star, two-step delete and orphan sweep
//! - Storage usage and the quota warning threshold

mod folder;
mod metadata;
mod quota;
mod service;

pub use folder::{Folder, FolderRepository, NewFolder};
pub use metadata::{sort_newest_first, FileFilter, FileRecord, FileRepository, NewFile};
pub use quota::{quota_warning, QuotaPolicy, StorageUsage, DEFAULT_QUOTA_WARNING_BYTES};
pub use service::{FileService, FolderService, UploadRequest};

/// Parent id of top-level folders and files.
pub const ROOT_FOLDER_ID: i64 = 0;

/// Maximum length for file and folder names (in characters).
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum folder nesting depth followed when building a path.
pub const MAX_FOLDER_DEPTH: usize = 32;

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Format a byte count for display ("512 B", "1.5 KB", "3.2 MB").
pub fn format_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes.max(0) as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else {
        format!("{:.1} GB", b / GB)
    }
}
