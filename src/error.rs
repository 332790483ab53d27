//! Error types for cloudnest.

use thiserror::Error;

/// Common error type for cloudnest.
#[derive(Error, Debug)]
pub enum CloudError {
    /// The session is missing, invalid or expired.
    ///
    /// Pages treat this as a redirect to the login route rather than an error.
    #[error("session expired")]
    AuthExpired,

    /// A read against the metadata store failed.
    #[error("query failed: {0}")]
    Query(String),

    /// A create or update against the metadata store failed.
    #[error("write failed: {0}")]
    Write(String),

    /// A blob store operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The metadata record was deleted but the blob could not be removed.
    ///
    /// The blob stays behind as an orphan until the next sweep.
    #[error("file {file_id} metadata deleted but blob {key} was not removed: {reason}")]
    PartialDelete {
        /// ID of the deleted file record.
        file_id: i64,
        /// Blob key that is still present.
        key: String,
        /// Why the blob removal failed.
        reason: String,
    },

    /// Generic database error (connection, migration).
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An upload exceeds the configured size limit.
    #[error("file is too large (max {}MB)", .max_bytes / 1024 / 1024)]
    FileTooLarge {
        /// Largest accepted upload in bytes.
        max_bytes: u64,
    },

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for CloudError {
    fn from(e: sqlx::Error) -> Self {
        CloudError::Database(e.to_string())
    }
}

impl CloudError {
    /// Whether this error should be shown to the user as a failure notification.
    ///
    /// Session expiry is handled by redirecting instead.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, CloudError::AuthExpired)
    }
}

/// Result type alias for cloudnest operations.
pub type Result<T> = std::result::Result<T, CloudError>;
