//! Test helpers for Web API tests.
//!
//! Builds the full router over an in-memory database and an in-memory
//! blob store, and mints session tokens the way the identity provider would.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;

use cloudnest::config::Config;
use cloudnest::file::{FileRepository, NewFile};
use cloudnest::storage::{BlobStore, MemoryBlobStore};
use cloudnest::web::{create_router, router::create_health_router, AppState};
use cloudnest::{CloudError, Database, Result, SessionProvider};

pub const TEST_SECRET: &str = "test-secret-key-for-integration-tests";
pub const OWNER: &str = "ada@example.com";
pub const OTHER: &str = "grace@example.com";

/// Handles to everything behind a test server.
pub struct TestContext {
    pub server: TestServer,
    pub db: Database,
    pub blobs: Arc<dyn BlobStore>,
    pub sessions: SessionProvider,
}

impl TestContext {
    /// Authorization header value for `email`.
    pub fn bearer(&self, email: &str) -> String {
        let token = self.sessions.issue(email).expect("Failed to issue token");
        format!("Bearer {}", token)
    }

    /// Insert a file record directly, bypassing the blob store.
    pub async fn insert_file(&self, owner: &str, name: &str, size: i64) -> i64 {
        let image_name = format!("{}.bin", uuid::Uuid::new_v4());
        FileRepository::new(self.db.pool())
            .create(&NewFile::new(name, image_name, owner, 0, size))
            .await
            .expect("Failed to insert file")
            .id
    }
}

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.session.jwt_secret = TEST_SECRET.to_string();
    config.storage.max_upload_size_mb = 1;
    config
}

pub fn build_router(config: &Config, db: Database, blobs: Arc<dyn BlobStore>) -> Router {
    let state = Arc::new(AppState::new(config, db, blobs));
    create_router(state, &[]).merge(create_health_router())
}

pub async fn create_test_context() -> TestContext {
    create_test_context_with_store(Arc::new(MemoryBlobStore::new())).await
}

pub async fn create_test_context_with_store(blobs: Arc<dyn BlobStore>) -> TestContext {
    let config = create_test_config();
    let db = Database::open_in_memory()
        .await
        .expect("Failed to open database");
    let router = build_router(&config, db.clone(), blobs.clone());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext {
        server,
        db,
        blobs,
        sessions: SessionProvider::from_config(&config.session),
    }
}

/// Blob store whose removals always fail.
pub struct FailingRemoveStore {
    inner: MemoryBlobStore,
}

impl FailingRemoveStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryBlobStore::new(),
        }
    }
}

#[async_trait]
impl BlobStore for FailingRemoveStore {
    fn backend_name(&self) -> &'static str {
        "failing-remove"
    }

    async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        self.inner.put(key, content).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.inner.get(key).await
    }

    async fn remove(&self, _key: &str) -> Result<bool> {
        Err(CloudError::Storage("bucket unavailable".to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(prefix).await
    }
}
