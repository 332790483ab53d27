//! Page handlers.
//!
//! Each page runs the same client flow a browser would: resolve the
//! session, redirect to the login route when unauthenticated, otherwise
//! load the lists and return the rendered view as JSON.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;

use crate::app::{Navigation, PageKind};
use crate::web::dto::PageView;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentSession;

async fn render(
    state: &AppState,
    session: CurrentSession,
    kind: PageKind,
) -> Result<Response, ApiError> {
    let CurrentSession(session) = session;

    if let (PageKind::Folder(id), Some(owner)) = (kind, session.email.as_deref()) {
        state.folders.get_folder(owner, id).await?;
    }

    let mut client = state.client(session);
    match client.navigate(&kind.path()).await? {
        Navigation::Redirect(to) => Ok(Redirect::to(&to).into_response()),
        Navigation::Stay => {
            let page = client
                .page()
                .ok_or_else(|| ApiError::internal("Page not mounted"))?;
            Ok(Json(PageView::new(page, client.shell())).into_response())
        }
    }
}

/// GET / - Root folders and files.
pub async fn home_page(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> Result<Response, ApiError> {
    render(&state, session, PageKind::Home).await
}

/// GET /starred - Starred files.
pub async fn starred_page(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
) -> Result<Response, ApiError> {
    render(&state, session, PageKind::Starred).await
}

/// GET /folder/:id - Contents of one folder.
pub async fn folder_page(
    State(state): State<Arc<AppState>>,
    session: CurrentSession,
    Path(folder_id): Path<i64>,
) -> Result<Response, ApiError> {
    render(&state, session, PageKind::Folder(folder_id)).await
}
