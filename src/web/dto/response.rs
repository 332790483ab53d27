//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::app::{
    EntryState, FileEntry, ListPage, NavShell, PageKind, ShellModal, Toast, ToastMode, MENU,
    QUOTA_WARNING_MESSAGE,
};
use crate::file::{format_size, FileRecord, Folder};
use crate::session::{Session, SessionStatus};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Folder in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (0 for root).
    pub parent_folder_id: i64,
    /// Creation timestamp (RFC 3339).
    pub created_date: String,
}

impl From<&Folder> for FolderResponse {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            parent_folder_id: folder.parent_folder_id,
            created_date: folder.created_date.to_rfc3339(),
        }
    }
}

/// Folder with its breadcrumb.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderDetailResponse {
    /// The folder.
    pub folder: FolderResponse,
    /// Path from the root down to the folder.
    pub path: Vec<FolderResponse>,
}

/// File in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Original filename.
    pub name: String,
    /// Blob name.
    pub image_name: String,
    /// Folder ID (0 for root).
    pub parent_folder_id: i64,
    /// Whether the file is starred.
    pub is_starred: bool,
    /// Size in bytes.
    pub size: i64,
    /// Size for display.
    pub size_display: String,
    /// Upload timestamp (RFC 3339).
    pub created_date: String,
    /// `pending` while a change is unconfirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl From<&FileRecord> for FileResponse {
    fn from(file: &FileRecord) -> Self {
        Self {
            id: file.id,
            name: file.name.clone(),
            image_name: file.image_name.clone(),
            parent_folder_id: file.parent_folder_id,
            is_starred: file.is_starred,
            size: file.size,
            size_display: format_size(file.size),
            created_date: file.created_date.to_rfc3339(),
            state: None,
        }
    }
}

impl From<&FileEntry> for FileResponse {
    fn from(entry: &FileEntry) -> Self {
        let mut response = FileResponse::from(&entry.file);
        response.state = match entry.state {
            EntryState::Confirmed => None,
            EntryState::Pending => Some("pending".to_string()),
        };
        response
    }
}

/// Session status response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// `authenticated`, `unauthenticated` or `loading`.
    pub status: String,
    /// Signed-in user's email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        let status = match session.status {
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Unauthenticated => "unauthenticated",
            SessionStatus::Loading => "loading",
        };
        Self {
            status: status.to_string(),
            email: session.email.clone(),
        }
    }
}

/// Side menu entry.
#[derive(Debug, Serialize)]
pub struct MenuEntryView {
    /// Display label.
    pub label: &'static str,
    /// Route.
    pub path: &'static str,
    /// Whether the entry is highlighted.
    pub active: bool,
}

/// Navigation shell state.
#[derive(Debug, Serialize)]
pub struct ShellView {
    /// Menu entries.
    pub menu: Vec<MenuEntryView>,
    /// Active entry, `-1` when none.
    pub active_index: i64,
    /// Storage used in bytes.
    pub used_bytes: u64,
    /// Storage used for display.
    pub used_display: String,
    /// Banner text when over the warning threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_warning: Option<&'static str>,
    /// Open dialog.
    pub modal: ShellModal,
}

impl From<&NavShell> for ShellView {
    fn from(shell: &NavShell) -> Self {
        Self {
            menu: MENU
                .iter()
                .enumerate()
                .map(|(i, item)| MenuEntryView {
                    label: item.label,
                    path: item.path,
                    active: shell.is_active(i),
                })
                .collect(),
            active_index: shell.active_index(),
            used_bytes: shell.used_storage(),
            used_display: format_size(shell.used_storage() as i64),
            quota_warning: shell
                .show_quota_warning()
                .then_some(QUOTA_WARNING_MESSAGE),
            modal: shell.modal(),
        }
    }
}

/// Toast in page views.
#[derive(Debug, Serialize)]
pub struct ToastView {
    /// Text.
    pub message: String,
    /// Styling.
    pub mode: ToastMode,
}

impl From<&Toast> for ToastView {
    fn from(toast: &Toast) -> Self {
        Self {
            message: toast.message.clone(),
            mode: toast.mode,
        }
    }
}

/// A rendered list page.
#[derive(Debug, Serialize)]
pub struct PageView {
    /// `home`, `starred` or `folder`.
    pub page: &'static str,
    /// Route of the page.
    pub path: String,
    /// Heading.
    pub title: String,
    /// Folder that new folders and uploads go into.
    pub parent_folder_id: i64,
    /// Navigation shell.
    pub shell: ShellView,
    /// Breadcrumb for folder pages.
    pub breadcrumb: Vec<FolderResponse>,
    /// Folders, newest first.
    pub folders: Vec<FolderResponse>,
    /// Files, newest first.
    pub files: Vec<FileResponse>,
    /// Visible toast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<ToastView>,
}

impl PageView {
    /// Render a page and the shell around it.
    pub fn new(page: &ListPage, shell: &NavShell) -> Self {
        let kind = page.kind();
        let (name, title) = match kind {
            PageKind::Home => ("home", "My Drive".to_string()),
            PageKind::Starred => ("starred", "Starred Files".to_string()),
            PageKind::Folder(_) => (
                "folder",
                page.path()
                    .last()
                    .map(|f| f.name.clone())
                    .unwrap_or_default(),
            ),
        };

        Self {
            page: name,
            path: kind.path(),
            title,
            parent_folder_id: kind.parent_folder_id(),
            shell: ShellView::from(shell),
            breadcrumb: page.path().iter().map(FolderResponse::from).collect(),
            folders: page.folders().iter().map(FolderResponse::from).collect(),
            files: page.files().iter().map(FileResponse::from).collect(),
            toast: page.toast().map(ToastView::from),
        }
    }
}
