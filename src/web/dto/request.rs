//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::file::{FileFilter, MAX_NAME_LENGTH, ROOT_FOLDER_ID};

/// Create folder request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
    /// Parent folder ID (0 or omitted for root).
    #[serde(default)]
    pub parent_folder_id: i64,
}

/// Star update request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StarRequest {
    /// New starred flag.
    pub is_starred: bool,
}

/// Folder listing query.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FolderListQuery {
    /// Parent folder ID (root when omitted).
    pub parent_folder_id: Option<i64>,
}

impl FolderListQuery {
    /// Parent folder to list.
    pub fn parent(&self) -> i64 {
        self.parent_folder_id.unwrap_or(ROOT_FOLDER_ID)
    }
}

/// File listing query.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileListQuery {
    /// Only files in this folder.
    pub parent_folder_id: Option<i64>,
    /// Only files with this starred flag.
    pub starred: Option<bool>,
}

impl FileListQuery {
    /// Convert to a repository filter.
    pub fn to_filter(&self) -> FileFilter {
        FileFilter {
            parent_folder_id: self.parent_folder_id,
            is_starred: self.starred,
        }
    }
}
