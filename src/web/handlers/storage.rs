//! Storage usage handler.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::file::StorageUsage;
use crate::web::dto::ApiResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/storage - Used storage and quota warning.
#[utoipa::path(
    get,
    path = "/api/storage",
    tag = "storage",
    responses(
        (status = 200, description = "Storage usage", body = StorageUsage),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_storage(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
) -> Result<Json<ApiResponse<StorageUsage>>, ApiError> {
    let used = state.files.compute_used_storage(&owner).await?;
    Ok(Json(ApiResponse::new(state.quota.usage(used))))
}
