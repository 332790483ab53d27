//! Shared client state.
//!
//! Holds the session, the folder new uploads and folders land in, refresh
//! signals, and the last computed storage usage. Each value is a
//! `tokio::sync::watch` channel so pages can subscribe to changes.

use tokio::sync::watch;

use crate::file::ROOT_FOLDER_ID;
use crate::session::Session;

/// Application state shared by the shell and the pages.
#[derive(Debug, Clone)]
pub struct Workspace {
    session: watch::Sender<Session>,
    parent_folder_id: watch::Sender<i64>,
    folder_refresh: watch::Sender<u64>,
    file_refresh: watch::Sender<u64>,
    used_storage: watch::Sender<u64>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create a workspace whose session is still loading.
    pub fn new() -> Self {
        Self {
            session: watch::Sender::new(Session::loading()),
            parent_folder_id: watch::Sender::new(ROOT_FOLDER_ID),
            folder_refresh: watch::Sender::new(0),
            file_refresh: watch::Sender::new(0),
            used_storage: watch::Sender::new(0),
        }
    }

    /// Current session.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Replace the session. Subscribers are only woken on an actual change.
    pub fn set_session(&self, session: Session) {
        self.session.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        });
    }

    /// Subscribe to session changes.
    pub fn subscribe_session(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Folder that new folders and uploads go into.
    pub fn parent_folder_id(&self) -> i64 {
        *self.parent_folder_id.borrow()
    }

    /// Set the folder that new folders and uploads go into.
    pub fn set_parent_folder_id(&self, id: i64) {
        self.parent_folder_id.send_replace(id);
    }

    /// Ask folder lists to refetch.
    pub fn signal_folder_refresh(&self) {
        self.folder_refresh.send_modify(|n| *n = n.wrapping_add(1));
    }

    /// Subscribe to folder refresh signals.
    pub fn subscribe_folder_refresh(&self) -> watch::Receiver<u64> {
        self.folder_refresh.subscribe()
    }

    /// Ask file lists to refetch.
    pub fn signal_file_refresh(&self) {
        self.file_refresh.send_modify(|n| *n = n.wrapping_add(1));
    }

    /// Subscribe to file refresh signals.
    pub fn subscribe_file_refresh(&self) -> watch::Receiver<u64> {
        self.file_refresh.subscribe()
    }

    /// Last computed storage usage in bytes.
    pub fn used_storage(&self) -> u64 {
        *self.used_storage.borrow()
    }

    /// Record storage usage.
    pub fn set_used_storage(&self, bytes: u64) {
        self.used_storage.send_replace(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ws = Workspace::new();
        assert_eq!(ws.session(), Session::loading());
        assert_eq!(ws.parent_folder_id(), ROOT_FOLDER_ID);
        assert_eq!(ws.used_storage(), 0);
    }

    #[test]
    fn test_session_change_notifies_once() {
        let ws = Workspace::new();
        let mut rx = ws.subscribe_session();

        ws.set_session(Session::authenticated("ada@example.com"));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        ws.set_session(Session::authenticated("ada@example.com"));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_refresh_signals() {
        let ws = Workspace::new();
        let mut files = ws.subscribe_file_refresh();
        let folders = ws.subscribe_folder_refresh();

        ws.signal_file_refresh();
        assert!(files.has_changed().unwrap());
        assert!(!folders.has_changed().unwrap());

        files.borrow_and_update();
        assert!(!files.has_changed().unwrap());
    }

    #[test]
    fn test_clones_share_state() {
        let ws = Workspace::new();
        let other = ws.clone();

        other.set_parent_folder_id(9);
        other.set_used_storage(1024);

        assert_eq!(ws.parent_folder_id(), 9);
        assert_eq!(ws.used_storage(), 1024);
    }
}
