//! Application module.
//!
//! Client-side state for the file manager: the navigation shell, the list
//! pages, toasts, and the shared workspace. [`CloudApp`] wires them to the
//! services the same way a browser session would.

mod menu;
mod pages;
mod toast;
mod workspace;

pub use menu::{menu_index, MenuItem, NavShell, ShellModal, MENU, QUOTA_WARNING_MESSAGE};
pub use pages::{EntryState, FileEntry, ListPage, PageEffect, PageKind};
pub use toast::{Toast, ToastMode, DELETE_SUCCESS_MESSAGE, TOAST_DURATION};
pub use workspace::Workspace;

use std::time::Instant;

use tokio::sync::watch;
use tracing::debug;

use crate::file::{FileRecord, FileService, Folder, FolderService, QuotaPolicy, UploadRequest};
use crate::session::Session;
use crate::{CloudError, Result};

/// Outcome of navigating or syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The page is showing.
    Stay,
    /// Leave for this route.
    Redirect(String),
}

/// One user's view of the file manager.
pub struct CloudApp {
    folders: FolderService,
    files: FileService,
    workspace: Workspace,
    shell: NavShell,
    page: Option<ListPage>,
    login_path: String,
    session_rx: watch::Receiver<Session>,
    folder_refresh_rx: watch::Receiver<u64>,
    file_refresh_rx: watch::Receiver<u64>,
}

impl CloudApp {
    /// Create an app with a fresh workspace.
    pub fn new(
        folders: FolderService,
        files: FileService,
        quota: QuotaPolicy,
        login_path: impl Into<String>,
    ) -> Self {
        Self::with_workspace(folders, files, quota, login_path, Workspace::new())
    }

    /// Create an app attached to an existing workspace.
    pub fn with_workspace(
        folders: FolderService,
        files: FileService,
        quota: QuotaPolicy,
        login_path: impl Into<String>,
        workspace: Workspace,
    ) -> Self {
        Self {
            folders,
            files,
            session_rx: workspace.subscribe_session(),
            folder_refresh_rx: workspace.subscribe_folder_refresh(),
            file_refresh_rx: workspace.subscribe_file_refresh(),
            workspace,
            shell: NavShell::new(quota.warning_bytes),
            page: None,
            login_path: login_path.into(),
        }
    }

    /// Shared state.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Navigation shell.
    pub fn shell(&self) -> &NavShell {
        &self.shell
    }

    /// Navigation shell, mutably.
    pub fn shell_mut(&mut self) -> &mut NavShell {
        &mut self.shell
    }

    /// Current page.
    pub fn page(&self) -> Option<&ListPage> {
        self.page.as_ref()
    }

    /// Current page, mutably.
    pub fn page_mut(&mut self) -> Option<&mut ListPage> {
        self.page.as_mut()
    }

    /// Mount the page for `path` and run it against the current session.
    pub async fn navigate(&mut self, path: &str) -> Result<Navigation> {
        let kind = PageKind::from_path(path)
            .ok_or_else(|| CloudError::NotFound(format!("page {path}")))?;

        self.shell.mount(path);
        self.workspace.set_parent_folder_id(kind.parent_folder_id());
        self.page = Some(ListPage::new(kind));

        let session = self.session_rx.borrow_and_update().clone();
        self.folder_refresh_rx.mark_unchanged();
        self.file_refresh_rx.mark_unchanged();

        let effect = self.page_on_session(&session);
        Ok(self.apply(effect).await)
    }

    /// Follow a menu click.
    pub async fn click_menu(&mut self, index: usize) -> Result<Navigation> {
        let path = self
            .shell
            .click(index)
            .ok_or_else(|| CloudError::NotFound(format!("menu entry {index}")))?;
        self.navigate(path).await
    }

    /// Process session changes and refresh signals since the last call.
    pub async fn sync(&mut self) -> Navigation {
        if self.session_rx.has_changed().unwrap_or(false) {
            let session = self.session_rx.borrow_and_update().clone();
            let effect = self.page_on_session(&session);
            if effect != PageEffect::Idle {
                return self.apply(effect).await;
            }
        }

        let folders_changed = self.folder_refresh_rx.has_changed().unwrap_or(false);
        let files_changed = self.file_refresh_rx.has_changed().unwrap_or(false);
        if folders_changed || files_changed {
            self.folder_refresh_rx.mark_unchanged();
            self.file_refresh_rx.mark_unchanged();
            let effect = self
                .page
                .as_ref()
                .map_or(PageEffect::Idle, ListPage::on_refresh);
            return self.apply(effect).await;
        }

        Navigation::Stay
    }

    /// Create a folder in the workspace's current folder.
    ///
    /// Failures are shown as a toast.
    pub async fn create_folder(&mut self, name: &str, now: Instant) -> Option<Folder> {
        let result = match self.owner() {
            Ok(owner) => {
                self.folders
                    .create_folder(name, self.workspace.parent_folder_id(), &owner)
                    .await
            }
            Err(e) => Err(e),
        };
        self.shell.close_modal();

        match result {
            Ok(folder) => {
                self.workspace.signal_folder_refresh();
                self.show_toast(Toast::success("Folder created successfully!", now));
                Some(folder)
            }
            Err(e) => {
                if e.is_user_visible() {
                    self.show_toast(Toast::error(format!("Error creating folder: {e}"), now));
                }
                None
            }
        }
    }

    /// Upload a file into the workspace's current folder.
    ///
    /// Failures are shown as a toast.
    pub async fn upload_file(&mut self, name: &str, content: Vec<u8>, now: Instant) -> Option<FileRecord> {
        let request = UploadRequest::new(name, content).in_folder(self.workspace.parent_folder_id());
        let result = match self.owner() {
            Ok(owner) => self.files.upload_file(request, &owner).await,
            Err(e) => Err(e),
        };
        self.shell.close_modal();

        match result {
            Ok(file) => {
                self.workspace.signal_file_refresh();
                self.show_toast(Toast::success("File uploaded successfully!", now));
                Some(file)
            }
            Err(e) => {
                if e.is_user_visible() {
                    self.show_toast(Toast::error(format!("Error uploading file: {e}"), now));
                }
                None
            }
        }
    }

    /// Run the delete confirmed on the current page.
    pub async fn confirm_delete(&mut self, now: Instant) -> bool {
        let Some(page) = self.page.as_mut() else {
            return false;
        };
        let deleted = page.confirm_delete(&self.files, now).await;
        if deleted {
            self.refresh_used_storage().await;
        }
        deleted
    }

    /// Flip a file's star on the current page.
    pub async fn toggle_star(&mut self, file_id: i64, now: Instant) -> bool {
        match self.page.as_mut() {
            Some(page) => page.toggle_star(&self.files, file_id, now).await,
            None => false,
        }
    }

    /// Expire timed-out toasts.
    pub fn tick(&mut self, now: Instant) {
        if let Some(page) = self.page.as_mut() {
            page.tick(now);
        }
    }

    fn owner(&self) -> Result<String> {
        self.workspace
            .session()
            .require_email()
            .map(str::to_string)
    }

    fn show_toast(&mut self, toast: Toast) {
        if let Some(page) = self.page.as_mut() {
            page.show_toast(toast);
        }
    }

    fn page_on_session(&mut self, session: &Session) -> PageEffect {
        self.page
            .as_mut()
            .map_or(PageEffect::Idle, |page| page.on_session(session))
    }

    async fn apply(&mut self, effect: PageEffect) -> Navigation {
        match effect {
            PageEffect::RedirectToLogin => Navigation::Redirect(self.login_path.clone()),
            PageEffect::Fetch => {
                if let Some(page) = self.page.as_mut() {
                    page.load(&self.folders, &self.files).await;
                    let used = page.used_storage();
                    self.set_used_storage(used);
                }
                Navigation::Stay
            }
            PageEffect::Idle => Navigation::Stay,
        }
    }

    async fn refresh_used_storage(&mut self) {
        let Ok(owner) = self.owner() else {
            return;
        };
        match self.files.compute_used_storage(&owner).await {
            Ok(used) => self.set_used_storage(used),
            Err(e) => debug!(error = %e, "Storage usage not refreshed"),
        }
    }

    fn set_used_storage(&mut self, used: u64) {
        self.shell.set_used_storage(used);
        self.workspace.set_used_storage(used);
    }
}

impl std::fmt::Debug for CloudApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudApp")
            .field("shell", &self.shell)
            .field("page", &self.page.as_ref().map(ListPage::kind))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::db::Database;
    use crate::storage::MemoryBlobStore;

    const OWNER: &str = "ada@example.com";

    async fn app() -> CloudApp {
        let db = Database::open_in_memory().await.unwrap();
        CloudApp::new(
            FolderService::new(db.clone()),
            FileService::new(db, Arc::new(MemoryBlobStore::new())),
            QuotaPolicy::default(),
            "/login",
        )
    }

    #[tokio::test]
    async fn test_unauthenticated_home_redirects() {
        let mut app = app().await;
        app.workspace().set_session(Session::unauthenticated());

        let nav = app.navigate("/").await.unwrap();
        assert_eq!(nav, Navigation::Redirect("/login".to_string()));
        assert!(app.page().unwrap().folders().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_does_not_touch_store() {
        let db = Database::open_in_memory().await.unwrap();
        let mut app = CloudApp::new(
            FolderService::new(db.clone()),
            FileService::new(db.clone(), Arc::new(MemoryBlobStore::new())),
            QuotaPolicy::default(),
            "/login",
        );
        // Holding the pool's only connection stalls any query
        let _held = db.pool().acquire().await.unwrap();
        app.workspace().set_session(Session::unauthenticated());

        let nav = tokio::time::timeout(Duration::from_secs(2), app.navigate("/"))
            .await
            .expect("navigation waited on the metadata store")
            .unwrap();
        assert_eq!(nav, Navigation::Redirect("/login".to_string()));

        let nav = tokio::time::timeout(Duration::from_secs(2), app.sync())
            .await
            .expect("sync waited on the metadata store");
        assert_eq!(nav, Navigation::Stay);
        assert!(app.page().unwrap().files().is_empty());
    }

    #[tokio::test]
    async fn test_loading_then_authenticated_fetches() {
        let mut app = app().await;

        assert_eq!(app.navigate("/").await.unwrap(), Navigation::Stay);
        assert!(app.page().unwrap().is_loading());

        app.workspace().set_session(Session::authenticated(OWNER));
        assert_eq!(app.sync().await, Navigation::Stay);
        assert!(!app.page().unwrap().is_loading());
    }

    #[tokio::test]
    async fn test_upload_signals_refresh() {
        let mut app = app().await;
        app.workspace().set_session(Session::authenticated(OWNER));
        app.navigate("/").await.unwrap();

        app.shell_mut().open_upload_modal();
        let file = app
            .upload_file("notes.txt", b"hello".to_vec(), Instant::now())
            .await
            .unwrap();
        assert_eq!(app.shell().modal(), ShellModal::None);

        app.sync().await;

        let page = app.page().unwrap();
        assert_eq!(page.files()[0].file.id, file.id);
        assert_eq!(app.workspace().used_storage(), 5);
        assert_eq!(app.shell().used_storage(), 5);
    }

    #[tokio::test]
    async fn test_folder_page_sets_parent_for_new_items() {
        let mut app = app().await;
        app.workspace().set_session(Session::authenticated(OWNER));
        app.navigate("/").await.unwrap();

        let docs = app.create_folder("Docs", Instant::now()).await.unwrap();
        app.navigate(&format!("/folder/{}", docs.id)).await.unwrap();
        assert_eq!(app.workspace().parent_folder_id(), docs.id);
        assert_eq!(app.shell().active_index(), -1);

        let file = app
            .upload_file("inside.txt", b"x".to_vec(), Instant::now())
            .await
            .unwrap();
        assert_eq!(file.parent_folder_id, docs.id);

        app.sync().await;
        let page = app.page().unwrap();
        assert_eq!(page.path()[0].name, "Docs");
        assert_eq!(page.files().len(), 1);
    }

    #[tokio::test]
    async fn test_click_menu_navigates() {
        let mut app = app().await;
        app.workspace().set_session(Session::authenticated(OWNER));

        app.click_menu(1).await.unwrap();
        assert_eq!(app.page().unwrap().kind(), PageKind::Starred);
        assert_eq!(app.shell().active_index(), 1);

        assert!(matches!(
            app.click_menu(5).await,
            Err(CloudError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_updates_used_storage() {
        let mut app = app().await;
        app.workspace().set_session(Session::authenticated(OWNER));
        app.navigate("/").await.unwrap();

        let file = app
            .upload_file("a.bin", vec![0; 10], Instant::now())
            .await
            .unwrap();
        app.sync().await;
        assert_eq!(app.workspace().used_storage(), 10);

        app.page_mut().unwrap().request_delete(file.id);
        assert!(app.confirm_delete(Instant::now()).await);
        assert_eq!(app.workspace().used_storage(), 0);
    }
}
