//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{sort_newest_first, UploadRequest, ROOT_FOLDER_ID};
use crate::web::dto::{ApiResponse, FileListQuery, FileResponse, StarRequest};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Build a Content-Disposition header value that cannot inject headers.
///
/// Non-ASCII names also get an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && sanitized == filename {
        return format!("attachment; filename=\"{}\"", filename);
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized,
        urlencoding::encode(filename)
    )
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    tracing::warn!("Failed to read multipart body: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("File too large")
    } else {
        ApiError::bad_request("Invalid multipart data")
    }
}

/// GET /api/files - List files, newest first.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(FileListQuery),
    responses(
        (status = 200, description = "Matching files", body = Vec<FileResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let mut files = state.files.list_files(&owner, &query.to_filter()).await?;
    sort_newest_first(&mut files);

    Ok(Json(ApiResponse::new(
        files.iter().map(FileResponse::from).collect(),
    )))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" field and an optional
/// "parent_folder_id" field.
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 400, description = "Invalid multipart data"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut parent_folder_id = ROOT_FOLDER_ID;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                content = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            "parent_folder_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                parent_folder_id = text
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request("Invalid parent_folder_id"))?;
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;

    let request = UploadRequest::new(filename, content).in_folder(parent_folder_id);
    let file = state.files.upload_file(request, &owner).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from(&file))),
    ))
}

/// GET /api/files/:id - Get file metadata.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.files.get_file(&owner, file_id).await?;
    Ok(Json(ApiResponse::new(FileResponse::from(&file))))
}

/// GET /api/files/:id/content - Download file bytes.
#[utoipa::path(
    get,
    path = "/api/files/{id}/content",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Response, ApiError> {
    let (file, content) = state.files.read_content(&owner, file_id).await?;

    let content_type = mime_guess::from_path(&file.name)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content.len())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&file.name),
        )
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// PUT /api/files/:id/star - Set the starred flag.
#[utoipa::path(
    put,
    path = "/api/files/{id}/star",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    request_body = StarRequest,
    responses(
        (status = 200, description = "Updated file", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn star_file(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(file_id): Path<i64>,
    Json(req): Json<StarRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state
        .files
        .toggle_star(&owner, file_id, req.is_starred)
        .await?;
    Ok(Json(ApiResponse::new(FileResponse::from(&file))))
}

/// DELETE /api/files/:id - Delete a file.
///
/// A 500 with code `PARTIAL_DELETE` means the record is gone but the blob
/// was left behind for the orphan sweep.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Metadata deleted but blob removal failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.files.delete_file(&owner, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition_header("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_strips_injection() {
        let value = content_disposition_header("evil\r\nX-Injected: 1\".txt");
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));
        assert!(value.starts_with("attachment; filename=\"evilX-Injected: 1_.txt\""));
        assert!(value.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_content_disposition_unicode() {
        let value = content_disposition_header("写真.jpg");
        assert!(value.contains("filename*=UTF-8''%E5%86%99%E7%9C%9F.jpg"));
    }
}
