//! REST API Handlers
//!
//! Node catalog endpoints (listing, validation, stats) plus health and
//! readiness probes.

use crate::catalog::{nodes_in_category, CatalogStatsSnapshot, NodeCatalog};
use crate::domain::ports::{InvalidNode, NodeDescriptor};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default cap on node types accepted by one batch validation request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query parameters for node listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNodesQuery {
    /// Package prefix such as `n8n-nodes-base`, matched ignoring case
    #[serde(default)]
    pub category: Option<String>,
}

/// Node listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeListResponse {
    pub total: usize,
    pub count: usize,
    pub nodes: Vec<NodeDescriptor>,
}

/// Batch validation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateNodesRequest {
    pub node_types: Vec<String>,
}

/// Batch validation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateNodesResponse {
    pub valid: bool,
    pub invalid_nodes: Vec<InvalidNode>,
}

/// Catalog status response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatusResponse {
    pub node_count: usize,
    pub last_fetch: Option<DateTime<Utc>>,
    pub is_fetching: bool,
    pub freshness_window_secs: u64,
    /// Fraction of single validations that carried a suggestion
    pub suggestion_ratio: f64,
    pub stats: CatalogStatsSnapshot,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    catalog: NodeCatalog,
    max_batch_size: usize,
}

impl RestRouter {
    /// Create a new REST router
    pub fn new(catalog: NodeCatalog) -> Self {
        Self {
            catalog,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Limit the number of node types per batch validation request
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            catalog: self.catalog,
            max_batch_size: self.max_batch_size,
        };

        Router::new()
            // Node catalog endpoints
            .route("/v1/nodes", get(list_nodes))
            .route("/v1/nodes/validate", post(validate_nodes))
            .route("/v1/nodes/validate/:node_type", get(validate_node))
            .route("/v1/catalog/stats", get(catalog_status))
            // Health endpoints
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    catalog: NodeCatalog,
    max_batch_size: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// List known node types
async fn list_nodes(
    State(state): State<AppState>,
    Query(query): Query<ListNodesQuery>,
) -> impl IntoResponse {
    let descriptors = state.catalog.list_descriptors().await;
    let total = descriptors.len();
    let nodes = nodes_in_category(descriptors, query.category.as_deref());

    (
        StatusCode::OK,
        Json(NodeListResponse {
            total,
            count: nodes.len(),
            nodes,
        }),
    )
}

/// Validate a batch of node types
async fn validate_nodes(
    State(state): State<AppState>,
    Json(request): Json<ValidateNodesRequest>,
) -> impl IntoResponse {
    if request.node_types.len() > state.max_batch_size {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse {
                error: "batch_too_large".into(),
                message: format!(
                    "At most {} node types can be validated per request",
                    state.max_batch_size
                ),
                details: Some(format!("received {}", request.node_types.len())),
            }),
        )
            .into_response();
    }

    let invalid_nodes = state.catalog.validate_many(&request.node_types).await;
    info!(
        requested = request.node_types.len(),
        invalid = invalid_nodes.len(),
        "Validated node types"
    );

    (
        StatusCode::OK,
        Json(ValidateNodesResponse {
            valid: invalid_nodes.is_empty(),
            invalid_nodes,
        }),
    )
        .into_response()
}

/// Validate a single node type
async fn validate_node(
    State(state): State<AppState>,
    Path(node_type): Path<String>,
) -> impl IntoResponse {
    let result = state.catalog.validate(&node_type).await;
    debug!(node_type = %node_type, valid = result.valid, "Validated node type");
    (StatusCode::OK, Json(result))
}

/// Catalog freshness and counters
async fn catalog_status(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = &state.catalog;
    let stats = catalog.stats();
    (
        StatusCode::OK,
        Json(CatalogStatusResponse {
            node_count: catalog.node_count(),
            last_fetch: catalog.last_fetch_time(),
            is_fetching: catalog.is_fetching(),
            freshness_window_secs: catalog.freshness_window().as_secs(),
            suggestion_ratio: stats.suggestion_ratio(),
            stats,
        }),
    )
}

/// Health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    state.catalog.ensure_loaded().await;
    if state.catalog.node_count() > 0 {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "no node types loaded")
    }
}
