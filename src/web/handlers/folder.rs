//! Folder handlers for Web API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::web::dto::{
    ApiResponse, CreateFolderRequest, FolderDetailResponse, FolderListQuery, FolderResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/folders - List folders under a parent, newest first.
#[utoipa::path(
    get,
    path = "/api/folders",
    tag = "folders",
    params(FolderListQuery),
    responses(
        (status = 200, description = "Folders under the parent", body = Vec<FolderResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Query(query): Query<FolderListQuery>,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let mut folders = state.folders.list_folders(&owner, query.parent()).await?;
    folders.sort_by(|a, b| b.created_date.cmp(&a.created_date).then(b.id.cmp(&a.id)));

    Ok(Json(ApiResponse::new(
        folders.iter().map(FolderResponse::from).collect(),
    )))
}

/// POST /api/folders - Create a folder.
#[utoipa::path(
    post,
    path = "/api/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Parent folder not found"),
        (status = 422, description = "Invalid name")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let folder = state
        .folders
        .create_folder(&req.name, req.parent_folder_id, &owner)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderResponse::from(&folder))),
    ))
}

/// GET /api/folders/:id - Folder details with breadcrumb.
#[utoipa::path(
    get,
    path = "/api/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder details", body = FolderDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderDetailResponse>>, ApiError> {
    let folder = state.folders.get_folder(&owner, folder_id).await?;
    let path = state.folders.folder_path(&owner, folder_id).await?;

    Ok(Json(ApiResponse::new(FolderDetailResponse {
        folder: FolderResponse::from(&folder),
        path: path.iter().map(FolderResponse::from).collect(),
    })))
}
