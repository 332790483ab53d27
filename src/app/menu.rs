//! Navigation shell.
//!
//! Tracks which side-menu entry is active, the quota banner, and which
//! create/upload modal is open.

use serde::Serialize;

use crate::file::{quota_warning, DEFAULT_QUOTA_WARNING_BYTES};

/// Banner text shown when usage crosses the warning threshold.
pub const QUOTA_WARNING_MESSAGE: &str = "Warning: You have reached 90% of your storage limit!";

/// An entry of the side menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Display label.
    pub label: &'static str,
    /// Route the entry navigates to.
    pub path: &'static str,
}

/// The static side menu.
pub const MENU: &[MenuItem] = &[
    MenuItem {
        label: "Home",
        path: "/",
    },
    MenuItem {
        label: "Starred",
        path: "/starred",
    },
];

/// Index of the menu entry whose path equals `path`.
///
/// Query strings and fragments are ignored, as is a trailing slash on
/// anything but the root. Matching is on the route itself, so
/// `/starred?sort=name` and `/starred/` still highlight Starred.
pub fn menu_index(path: &str) -> Option<usize> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    };
    MENU.iter().position(|item| item.path == path)
}

/// Modal opened from the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellModal {
    /// No modal.
    #[default]
    None,
    /// "New Folder" dialog.
    CreateFolder,
    /// "Add New File" dialog.
    UploadFile,
}

/// Side navigation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavShell {
    active: Option<usize>,
    used_bytes: u64,
    warning_bytes: u64,
    show_warning: bool,
    modal: ShellModal,
}

impl Default for NavShell {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA_WARNING_BYTES)
    }
}

impl NavShell {
    /// Create a shell warning above `warning_bytes`.
    pub fn new(warning_bytes: u64) -> Self {
        Self {
            active: None,
            used_bytes: 0,
            warning_bytes,
            show_warning: false,
            modal: ShellModal::None,
        }
    }

    /// Derive the active entry from the route the shell was mounted on.
    pub fn mount(&mut self, path: &str) {
        self.active = menu_index(path);
    }

    /// Re-derive the active entry after back/forward navigation.
    pub fn on_popstate(&mut self, path: &str) {
        self.mount(path);
    }

    /// Activate a menu entry and return the path to navigate to.
    ///
    /// Out-of-range indices change nothing.
    pub fn click(&mut self, index: usize) -> Option<&'static str> {
        let item = MENU.get(index)?;
        self.active = Some(index);
        Some(item.path)
    }

    /// The active entry, if the current route is in the menu.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// The active entry as an index, `-1` when none is active.
    pub fn active_index(&self) -> i64 {
        self.active.map_or(-1, |i| i as i64)
    }

    /// Whether the entry at `index` renders as active.
    pub fn is_active(&self, index: usize) -> bool {
        self.active == Some(index)
    }

    /// Record new storage usage and re-evaluate the banner.
    pub fn set_used_storage(&mut self, used_bytes: u64) {
        self.used_bytes = used_bytes;
        self.show_warning = quota_warning(used_bytes, self.warning_bytes);
    }

    /// Last recorded storage usage.
    pub fn used_storage(&self) -> u64 {
        self.used_bytes
    }

    /// Whether the quota banner is shown.
    pub fn show_quota_warning(&self) -> bool {
        self.show_warning
    }

    /// Open the upload dialog.
    pub fn open_upload_modal(&mut self) {
        self.modal = ShellModal::UploadFile;
    }

    /// Open the new-folder dialog.
    pub fn open_create_folder_modal(&mut self) {
        self.modal = ShellModal::CreateFolder;
    }

    /// Close whichever dialog is open.
    pub fn close_modal(&mut self) {
        self.modal = ShellModal::None;
    }

    /// The open dialog.
    pub fn modal(&self) -> ShellModal {
        self.modal
    }
}
