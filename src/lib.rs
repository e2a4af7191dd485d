//! n8n Workflow Builder
//!
//! Exposes the n8n REST API as MCP tools and resources, and checks the node
//! types of submitted workflows against the instance's node catalog.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      MCP / REST surface                          │
//! │  ┌──────────────────────────┐   ┌──────────────────────────────┐ │
//! │  │  WorkflowBuilderServer   │   │  RestRouter (/v1, /health)   │ │
//! │  │  (stdio | HTTP /mcp)     │   │                              │ │
//! │  └────────────┬─────────────┘   └───────────────┬──────────────┘ │
//! │               │                                 │                │
//! │  ┌────────────┴─────────────┐   ┌───────────────┴──────────────┐ │
//! │  │      N8nApiClient        │◀──│         NodeCatalog          │ │
//! │  │   ({host}/api/v1, JSON)  │   │  (single-flight cache, TTL,  │ │
//! │  │                          │   │   fallback, suggestions)     │ │
//! │  └──────────────────────────┘   └──────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: node catalog cache, similarity search and fallback list
//! - [`client`]: n8n REST API client
//! - [`mcp`]: MCP tools, resources and transports
//! - [`api`]: REST endpoints and the HTTP server
//! - [`domain`]: core types and ports
//! - [`error`]: error types and handling

pub mod api;
pub mod catalog;
pub mod client;
pub mod domain;
pub mod error;
pub mod mcp;

// Re-export commonly used types
pub use api::{ApiServer, ApiServerConfig, RestRouter};

pub use catalog::{
    CatalogConfig, CatalogEvent, CatalogStatsSnapshot, NodeCatalog, StaticCatalogSource,
};

pub use client::{
    ApiClientConfig, ExecutionStatus, ListExecutionsOptions, ListWorkflowsOptions, N8nApiClient,
    Workflow,
};

pub use domain::ports::{
    Clock, InvalidNode, NodeCatalogSource, NodeDescriptor, SystemClock, ValidationResult,
};

pub use error::{Error, Result};

pub use mcp::{create_mcp_router, serve_stdio, WorkflowBuilderServer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
