//! List pages: Home, Starred and per-folder views.
//!
//! A page reacts to session changes and refresh signals, loads its lists
//! through the services, and runs the delete and star flows. Mutations
//! report through a toast; query failures are logged and leave the list
//! empty.

use std::time::Instant;

use tracing::{debug, warn};

use super::toast::{Toast, DELETE_SUCCESS_MESSAGE};
use crate::file::{
    sort_newest_first, FileFilter, FileRecord, FileService, Folder, FolderService, ROOT_FOLDER_ID,
};
use crate::session::{Session, SessionStatus};
use crate::{CloudError, Result};

/// Which list a page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Root folders and root files.
    Home,
    /// Starred files in any folder.
    Starred,
    /// Child folders and files of one folder.
    Folder(i64),
}

impl PageKind {
    /// Route of the page.
    pub fn path(&self) -> String {
        match self {
            PageKind::Home => "/".to_string(),
            PageKind::Starred => "/starred".to_string(),
            PageKind::Folder(id) => format!("/folder/{id}"),
        }
    }

    /// Resolve a route to a page.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        match path {
            "" => Some(PageKind::Home),
            "/starred" => Some(PageKind::Starred),
            _ => path
                .strip_prefix("/folder/")
                .and_then(|id| id.parse().ok())
                .map(PageKind::Folder),
        }
    }

    /// Folder new items go into while this page is shown.
    pub fn parent_folder_id(&self) -> i64 {
        match self {
            PageKind::Home | PageKind::Starred => ROOT_FOLDER_ID,
            PageKind::Folder(id) => *id,
        }
    }

    /// Filter for the page's file list.
    pub fn file_filter(&self) -> FileFilter {
        match self {
            PageKind::Home => FileFilter::in_folder(ROOT_FOLDER_ID),
            PageKind::Starred => FileFilter::starred(),
            PageKind::Folder(id) => FileFilter::in_folder(*id),
        }
    }

    /// Whether the page lists folders.
    pub fn shows_folders(&self) -> bool {
        !matches!(self, PageKind::Starred)
    }
}

/// What the caller should do after a page event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEffect {
    /// Leave for the login route. Nothing else runs for this page.
    RedirectToLogin,
    /// Load the page's lists.
    Fetch,
    /// Nothing to do.
    Idle,
}

/// Whether a list entry reflects the store or an unconfirmed local change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Matches the last store response.
    Confirmed,
    /// A mutation is in flight.
    Pending,
}

/// A file row.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// The record as the page currently shows it.
    pub file: FileRecord,
    /// Whether the row is confirmed.
    pub state: EntryState,
    /// Star value to restore if a pending star change fails.
    rollback_starred: Option<bool>,
}

impl FileEntry {
    fn confirmed(file: FileRecord) -> Self {
        Self {
            file,
            state: EntryState::Confirmed,
            rollback_starred: None,
        }
    }
}

/// State of one list page.
#[derive(Debug)]
pub struct ListPage {
    kind: PageKind,
    owner: Option<String>,
    redirected: bool,
    loading: bool,
    folders: Vec<Folder>,
    files: Vec<FileEntry>,
    path: Vec<Folder>,
    used_storage: u64,
    pending_delete: Option<i64>,
    deleting: Option<i64>,
    toast: Option<Toast>,
}

impl ListPage {
    /// Create a page that has not seen a session yet.
    pub fn new(kind: PageKind) -> Self {
        Self {
            kind,
            owner: None,
            redirected: false,
            loading: true,
            folders: Vec::new(),
            files: Vec::new(),
            path: Vec::new(),
            used_storage: 0,
            pending_delete: None,
            deleting: None,
            toast: None,
        }
    }

    /// Which list this page shows.
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Email of the user the lists belong to.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Whether the page has redirected to the login route.
    pub fn is_redirected(&self) -> bool {
        self.redirected
    }

    /// Whether lists are loading.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Folders, newest first.
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Files, newest first.
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Breadcrumb for folder pages, root first.
    pub fn path(&self) -> &[Folder] {
        &self.path
    }

    /// Storage usage computed on the last load.
    pub fn used_storage(&self) -> u64 {
        self.used_storage
    }

    /// File awaiting delete confirmation.
    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    /// Whether the delete confirmation modal is open.
    pub fn is_delete_modal_open(&self) -> bool {
        self.pending_delete.is_some()
    }

    /// File whose delete is executing.
    pub fn deleting(&self) -> Option<i64> {
        self.deleting
    }

    /// Visible toast.
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// React to the session status.
    pub fn on_session(&mut self, session: &Session) -> PageEffect {
        if self.redirected {
            return PageEffect::Idle;
        }

        match session.status {
            SessionStatus::Unauthenticated => {
                debug!(page = %self.kind.path(), "Session unauthenticated; redirecting");
                self.redirected = true;
                self.owner = None;
                self.loading = false;
                PageEffect::RedirectToLogin
            }
            SessionStatus::Authenticated => match session.email.as_deref() {
                Some(email) if self.owner.as_deref() != Some(email) => {
                    self.owner = Some(email.to_string());
                    PageEffect::Fetch
                }
                _ => PageEffect::Idle,
            },
            SessionStatus::Loading => PageEffect::Idle,
        }
    }

    /// React to an external refresh signal.
    pub fn on_refresh(&self) -> PageEffect {
        if self.redirected || self.owner.is_none() {
            PageEffect::Idle
        } else {
            PageEffect::Fetch
        }
    }

    /// Load the page's lists and recompute storage usage.
    ///
    /// Each list is one query. A failed query is logged and its list
    /// left empty.
    pub async fn load(&mut self, folders: &FolderService, files: &FileService) {
        let Some(owner) = self.owner.clone() else {
            return;
        };
        self.loading = true;

        if let PageKind::Folder(id) = self.kind {
            self.path = swallow("folder path", folders.folder_path(&owner, id).await);
        }

        self.folders = if self.kind.shows_folders() {
            let mut list = swallow(
                "folders",
                folders
                    .list_folders(&owner, self.kind.parent_folder_id())
                    .await,
            );
            list.sort_by(|a, b| b.created_date.cmp(&a.created_date).then(b.id.cmp(&a.id)));
            list
        } else {
            Vec::new()
        };

        let mut list = swallow(
            "files",
            files.list_files(&owner, &self.kind.file_filter()).await,
        );
        sort_newest_first(&mut list);
        self.files = list.into_iter().map(FileEntry::confirmed).collect();

        match files.compute_used_storage(&owner).await {
            Ok(bytes) => self.used_storage = bytes,
            Err(e) => warn!(error = %e, "Error computing storage usage"),
        }

        self.loading = false;
    }

    /// Open the delete confirmation for a listed file.
    pub fn request_delete(&mut self, file_id: i64) -> bool {
        if self.deleting.is_some() || self.position(file_id).is_none() {
            return false;
        }
        self.pending_delete = Some(file_id);
        true
    }

    /// Close the confirmation without deleting.
    pub fn cancel_delete(&mut self) {
        if self.deleting.is_none() {
            self.pending_delete = None;
        }
    }

    /// Start the confirmed delete. Returns the file to delete.
    pub fn begin_delete(&mut self) -> Option<i64> {
        let file_id = self.pending_delete?;
        if self.deleting.is_some() {
            return None;
        }
        self.deleting = Some(file_id);
        if let Some(i) = self.position(file_id) {
            self.files[i].state = EntryState::Pending;
        }
        Some(file_id)
    }

    /// Apply the outcome of a delete started with [`ListPage::begin_delete`].
    ///
    /// The row is removed only when both stores confirmed. Either way a
    /// toast is shown and the modal closes.
    pub fn finish_delete(&mut self, file_id: i64, result: Result<()>, now: Instant) {
        match result {
            Ok(()) => {
                self.files.retain(|entry| entry.file.id != file_id);
                self.toast = Some(Toast::success(DELETE_SUCCESS_MESSAGE, now));
            }
            Err(e) => {
                if let Some(i) = self.position(file_id) {
                    self.files[i].state = EntryState::Confirmed;
                }
                if e.is_user_visible() {
                    self.toast = Some(Toast::delete_failed(&e, now));
                }
            }
        }
        self.deleting = None;
        self.pending_delete = None;
    }

    /// Run the confirmed delete through the file service.
    pub async fn confirm_delete(&mut self, files: &FileService, now: Instant) -> bool {
        let Some(file_id) = self.begin_delete() else {
            return false;
        };

        let result = match self.owner.clone() {
            Some(owner) => files.delete_file(&owner, file_id).await.map(|_| ()),
            None => Err(CloudError::AuthExpired),
        };
        let ok = result.is_ok();
        self.finish_delete(file_id, result, now);
        ok
    }

    /// Optimistically flip a file's star. Returns the new value.
    pub fn begin_star(&mut self, file_id: i64) -> Option<bool> {
        let i = self.position(file_id)?;
        let entry = &mut self.files[i];
        if entry.state == EntryState::Pending {
            return None;
        }

        let value = !entry.file.is_starred;
        entry.rollback_starred = Some(entry.file.is_starred);
        entry.file.is_starred = value;
        entry.state = EntryState::Pending;
        Some(value)
    }

    /// Apply the outcome of a star change started with [`ListPage::begin_star`].
    ///
    /// A confirmed file that no longer matches the page's filter is dropped.
    pub fn finish_star(&mut self, file_id: i64, result: Result<FileRecord>, now: Instant) {
        let Some(i) = self.position(file_id) else {
            return;
        };

        match result {
            Ok(file) => {
                if self.kind.file_filter().matches(&file) {
                    self.files[i] = FileEntry::confirmed(file);
                } else {
                    self.files.remove(i);
                }
            }
            Err(e) => {
                let entry = &mut self.files[i];
                if let Some(previous) = entry.rollback_starred.take() {
                    entry.file.is_starred = previous;
                }
                entry.state = EntryState::Confirmed;
                if e.is_user_visible() {
                    self.toast = Some(Toast::error(format!("Error updating file: {e}"), now));
                }
            }
        }
    }

    /// Flip a file's star through the file service.
    pub async fn toggle_star(&mut self, files: &FileService, file_id: i64, now: Instant) -> bool {
        let Some(value) = self.begin_star(file_id) else {
            return false;
        };

        let result = match self.owner.clone() {
            Some(owner) => files.toggle_star(&owner, file_id, value).await,
            None => Err(CloudError::AuthExpired),
        };
        let ok = result.is_ok();
        self.finish_star(file_id, result, now);
        ok
    }

    /// Show a toast.
    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    /// Hide the toast once it has timed out.
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }

    fn position(&self, file_id: i64) -> Option<usize> {
        self.files.iter().position(|entry| entry.file.id == file_id)
    }
}

fn swallow<T>(what: &str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Error fetching {}", what);
        Vec::new()
    })
}
