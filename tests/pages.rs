//! Page Route Tests
//!
//! Pages run the client flow server-side: redirect without a session,
//! otherwise load the lists and render the shell around them.

mod common;

use std::time::Duration;

use axum::http::{header::AUTHORIZATION, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};
use tokio::time::timeout;

use common::{create_test_context, TestContext, OTHER, OWNER};

async fn create_folder(ctx: &TestContext, owner: &str, name: &str, parent: i64) -> i64 {
    let body: Value = ctx
        .server
        .post("/api/folders")
        .add_header(AUTHORIZATION, ctx.bearer(owner))
        .json(&json!({ "name": name, "parent_folder_id": parent }))
        .await
        .json();
    body["data"]["id"].as_i64().unwrap()
}

async fn upload(ctx: &TestContext, owner: &str, name: &str, parent: i64) -> i64 {
    let form = MultipartForm::new()
        .add_part("file", Part::bytes(b"content".to_vec()).file_name(name))
        .add_text("parent_folder_id", parent.to_string());
    let body: Value = ctx
        .server
        .post("/api/files")
        .add_header(AUTHORIZATION, ctx.bearer(owner))
        .multipart(form)
        .await
        .json();
    body["data"]["id"].as_i64().unwrap()
}

// ============================================================================
// Redirects
// ============================================================================

#[tokio::test]
async fn test_pages_redirect_without_session() {
    let ctx = create_test_context().await;

    for path in ["/", "/starred", "/folder/1"] {
        let response = ctx.server.get(path).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
    }
}

#[tokio::test]
async fn test_redirect_happens_before_any_query() {
    let ctx = create_test_context().await;
    // The in-memory pool has a single connection; while it is held every
    // store query waits for the pool's acquire timeout.
    let _held = ctx.db.pool().acquire().await.unwrap();

    for path in ["/", "/starred", "/folder/1"] {
        let response = timeout(Duration::from_secs(2), async { ctx.server.get(path).await })
            .await
            .expect("redirect waited on the metadata store");

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
    }
}

#[tokio::test]
async fn test_authenticated_page_waits_on_store() {
    let ctx = create_test_context().await;
    let auth = ctx.bearer(OWNER);
    let _held = ctx.db.pool().acquire().await.unwrap();

    let result = timeout(Duration::from_millis(500), async {
        ctx.server.get("/").add_header(AUTHORIZATION, auth).await
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_expired_token_redirects() {
    let ctx = create_test_context().await;

    let response = ctx
        .server
        .get("/starred")
        .add_header(AUTHORIZATION, "Bearer expired.or.forged")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
}

// ============================================================================
// Home
// ============================================================================

#[tokio::test]
async fn test_home_page_lists_root_entries() {
    let ctx = create_test_context().await;
    let folder = create_folder(&ctx, OWNER, "Projects", 0).await;
    upload(&ctx, OWNER, "root.txt", 0).await;
    upload(&ctx, OWNER, "nested.txt", folder).await;
    upload(&ctx, OTHER, "theirs.txt", 0).await;

    let response = ctx
        .server
        .get("/")
        .add_header(AUTHORIZATION, ctx.bearer(OWNER))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["page"], "home");
    assert_eq!(body["title"], "My Drive");
    assert_eq!(body["parent_folder_id"], 0);

    let folders = body["folders"].as_array().unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0]["name"], "Projects");

    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "root.txt");
}

#[tokio::test]
async fn test_home_page_shell() {
    let ctx = create_test_context().await;
    upload(&ctx, OWNER, "a.txt", 0).await;

    let body: Value = ctx
        .server
        .get("/")
        .add_header(AUTHORIZATION, ctx.bearer(OWNER))
        .await
        .json();

    let shell = &body["shell"];
    assert_eq!(shell["active_index"], 0);
    assert_eq!(shell["menu"][0]["active"], true);
    assert_eq!(shell["menu"][1]["active"], false);
    assert_eq!(shell["used_bytes"], 7);
    assert!(shell.get("quota_warning").is_none());
}

#[tokio::test]
async fn test_quota_banner_over_threshold() {
    let ctx = create_test_context().await;
    ctx.insert_file(OWNER, "huge.bin", 45 * 1024 * 1024 + 1).await;

    let body: Value = ctx
        .server
        .get("/")
        .add_header(AUTHORIZATION, ctx.bearer(OWNER))
        .await
        .json();

    assert_eq!(
        body["shell"]["quota_warning"],
        "Warning: You have reached 90% of your storage limit!"
    );
}

#[tokio::test]
async fn test_page_with_failing_queries_renders_empty() {
    let ctx = create_test_context().await;
    let auth = ctx.bearer(OWNER);
    ctx.db.close().await;

    let response = ctx.server.get("/").add_header(AUTHORIZATION, auth).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["folders"].as_array().unwrap().len(), 0);
    assert_eq!(body["files"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Starred
// ============================================================================

#[tokio::test]
async fn test_starred_page() {
    let ctx = create_test_context().await;
    let folder = create_folder(&ctx, OWNER, "Deep", 0).await;
    let nested = upload(&ctx, OWNER, "nested.txt", folder).await;
    upload(&ctx, OWNER, "plain.txt", 0).await;

    ctx.server
        .put(&format!("/api/files/{}/star", nested))
        .add_header(AUTHORIZATION, ctx.bearer(OWNER))
        .json(&json!({ "is_starred": true }))
        .await
        .assert_status_ok();

    let body: Value = ctx
        .server
        .get("/starred")
        .add_header(AUTHORIZATION, ctx.bearer(OWNER))
        .await
        .json();

    assert_eq!(body["page"], "starred");
    assert_eq!(body["title"], "Starred Files");
    assert_eq!(body["shell"]["active_index"], 1);
    assert_eq!(body["folders"].as_array().unwrap().len(), 0);

    // Starred files from any folder are listed
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "nested.txt");
}

// ============================================================================
// Folder
// ============================================================================

#[tokio::test]
async fn test_folder_page() {
    let ctx = create_test_context().await;
    let outer = create_folder(&ctx, OWNER, "Outer", 0).await;
    let inner = create_folder(&ctx, OWNER, "Inner", outer).await;
    upload(&ctx, OWNER, "inside.txt", inner).await;

    let response = ctx
        .server
        .get(&format!("/folder/{}", inner))
        .add_header(AUTHORIZATION, ctx.bearer(OWNER))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["page"], "folder");
    assert_eq!(body["title"], "Inner");
    assert_eq!(body["parent_folder_id"], inner);
    assert_eq!(body["shell"]["active_index"], -1);

    let breadcrumb: Vec<&str> = body["breadcrumb"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(breadcrumb, vec!["Outer", "Inner"]);

    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "inside.txt");
}

#[tokio::test]
async fn test_foreign_folder_page_not_found() {
    let ctx = create_test_context().await;
    let folder = create_folder(&ctx, OTHER, "Theirs", 0).await;

    ctx.server
        .get(&format!("/folder/{}", folder))
        .add_header(AUTHORIZATION, ctx.bearer(OWNER))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
