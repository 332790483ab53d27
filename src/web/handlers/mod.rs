//! API and page handlers.

pub mod file;
pub mod folder;
pub mod page;
pub mod session;
pub mod storage;

use std::sync::Arc;

use crate::app::CloudApp;
use crate::config::Config;
use crate::db::Database;
use crate::file::{FileService, FolderService, QuotaPolicy};
use crate::session::{Session, SessionProvider};
use crate::storage::BlobStore;

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Folder operations.
    pub folders: FolderService,
    /// File operations.
    pub files: FileService,
    /// Session token verifier.
    pub sessions: SessionProvider,
    /// Quota thresholds.
    pub quota: QuotaPolicy,
    /// Session cookie name.
    pub cookie_name: String,
    /// Where unauthenticated page requests are sent.
    pub login_path: String,
}

impl AppState {
    /// Build the state from configuration and opened stores.
    pub fn new(config: &Config, db: Database, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            folders: FolderService::new(db.clone()),
            files: FileService::new(db, blobs)
                .with_max_upload_size(config.storage.max_upload_size_bytes()),
            sessions: SessionProvider::from_config(&config.session),
            quota: QuotaPolicy::from_config(&config.storage),
            cookie_name: config.session.cookie_name.clone(),
            login_path: config.session.login_path.clone(),
        }
    }

    /// A client view for one request, seeded with the request's session.
    pub fn client(&self, session: Session) -> CloudApp {
        let app = CloudApp::new(
            self.folders.clone(),
            self.files.clone(),
            self.quota,
            self.login_path.clone(),
        );
        app.workspace().set_session(session);
        app
    }
}
