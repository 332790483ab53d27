//! Timed notifications.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::CloudError;

/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Toast message after a successful delete.
pub const DELETE_SUCCESS_MESSAGE: &str = "File deleted successfully!";

/// Toast flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastMode {
    /// The action completed.
    Success,
    /// The action failed.
    Error,
}

/// A transient notification shown for [`TOAST_DURATION`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Text shown to the user.
    pub message: String,
    /// Success or error styling.
    pub mode: ToastMode,
    shown_at: Instant,
}

impl Toast {
    /// A success toast shown at `now`.
    pub fn success(message: impl Into<String>, now: Instant) -> Self {
        Self {
            message: message.into(),
            mode: ToastMode::Success,
            shown_at: now,
        }
    }

    /// An error toast shown at `now`.
    pub fn error(message: impl Into<String>, now: Instant) -> Self {
        Self {
            message: message.into(),
            mode: ToastMode::Error,
            shown_at: now,
        }
    }

    /// Toast for a failed delete.
    pub fn delete_failed(error: &CloudError, now: Instant) -> Self {
        Self::error(format!("Error deleting file: {error}"), now)
    }

    /// Whether the toast has timed out at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= TOAST_DURATION
    }

    /// Time left before the toast hides.
    pub fn remaining(&self, now: Instant) -> Duration {
        TOAST_DURATION.saturating_sub(now.saturating_duration_since(self.shown_at))
    }
}
