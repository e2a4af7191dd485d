//! HTTP API Server
//!
//! Serves the REST catalog endpoints and, when enabled, the MCP Streamable
//! HTTP transport at `/mcp` on the same listener.

use crate::catalog::NodeCatalog;
use crate::client::N8nApiClient;
use crate::error::{Error, Result};
use crate::mcp::create_mcp_router;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::rest::{RestRouter, DEFAULT_MAX_BATCH_SIZE};

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Mount the MCP transport at `/mcp`
    pub mcp_enabled: bool,
    /// Allow cross-origin requests from any origin
    pub cors_enabled: bool,
    /// Max node types per batch validation request
    pub max_batch_size: usize,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8090)),
            mcp_enabled: true,
            cors_enabled: false,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

// =============================================================================
// API Server
// =============================================================================

/// HTTP server for the REST API and MCP transport
pub struct ApiServer {
    config: ApiServerConfig,
    client: Arc<N8nApiClient>,
    catalog: NodeCatalog,
    shutdown: CancellationToken,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, client: Arc<N8nApiClient>, catalog: NodeCatalog) -> Self {
        Self {
            config,
            client,
            catalog,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build the full application router
    pub fn router(&self) -> Router {
        let mut app = RestRouter::new(self.catalog.clone())
            .with_max_batch_size(self.config.max_batch_size)
            .build();

        if self.config.mcp_enabled {
            app = app.merge(create_mcp_router(
                self.client.clone(),
                self.catalog.clone(),
                self.shutdown.child_token(),
            ));
        }

        if self.config.cors_enabled {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Run the API server until shutdown is requested
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.addr;
        let app = self.router();
        let shutdown = self.shutdown.clone();

        info!("Starting API server");
        info!("  REST API: http://{}/v1", addr);
        if self.config.mcp_enabled {
            info!("  MCP endpoint: http://{}/mcp", addr);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal(format!("Failed to bind API server: {}", e)))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!("API server shutting down");
            })
            .await
            .map_err(|e| Error::Internal(format!("API server error: {}", e)))?;

        Ok(())
    }

    /// Trigger graceful shutdown; also closes open MCP sessions.
    ///
    /// Takes effect even when called before [`ApiServer::run`].
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
