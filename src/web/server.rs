//! Web server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::db::Database;
use crate::file::FileService;
use crate::storage::BlobStore;
use crate::{CloudError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_openapi_router, create_router};

/// Web server for pages and the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
    /// Orphan sweep period; zero disables the sweep.
    sweep_interval: Duration,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: Database, blobs: Arc<dyn BlobStore>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| CloudError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(config, db, blobs)),
            cors_origins: config.server.cors_origins.clone(),
            sweep_interval: Duration::from_secs(config.storage.orphan_sweep_interval_secs),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the full router.
    pub fn router(&self) -> Router {
        create_router(self.app_state.clone(), &self.cors_origins)
            .merge(create_health_router())
            .merge(create_openapi_router())
            .layer(CompressionLayer::new())
    }

    /// Start the orphaned blob sweep background task.
    ///
    /// Removes blobs left behind by partial deletes and failed uploads.
    fn start_orphan_sweep_task(files: FileService, period: Duration) {
        if period.is_zero() {
            tracing::info!("Orphan sweep disabled");
            return;
        }

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match files.sweep_orphaned_blobs().await {
                    Ok(removed) if !removed.is_empty() => {
                        tracing::info!(removed_count = removed.len(), "Swept orphaned blobs");
                    }
                    Ok(_) => tracing::debug!("No orphaned blobs to sweep"),
                    Err(e) => tracing::warn!(error = %e, "Orphan sweep failed"),
                }
            }
        });
        tracing::info!(interval_secs = period.as_secs(), "Orphan sweep task started");
    }

    async fn bind(self) -> std::io::Result<(TcpListener, Router)> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;

        Self::start_orphan_sweep_task(self.app_state.files.clone(), self.sweep_interval);

        tracing::info!("Web server listening on http://{}", listener.local_addr()?);
        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
