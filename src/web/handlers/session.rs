//! Session status handler.

use axum::Json;

use crate::web::dto::{ApiResponse, SessionResponse};
use crate::web::middleware::CurrentSession;

/// GET /api/session - Status of the caller's session.
///
/// Never rejects; an invalid token reports `unauthenticated`.
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "session",
    responses(
        (status = 200, description = "Session status", body = SessionResponse)
    )
)]
pub async fn get_session(
    CurrentSession(session): CurrentSession,
) -> Json<ApiResponse<SessionResponse>> {
    Json(ApiResponse::new(SessionResponse::from(&session)))
}
