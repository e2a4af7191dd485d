//! n8n API client
//!
//! JSON client for the n8n public REST API, also used as the node catalog's
//! remote source.

pub mod api;
pub mod types;

pub use api::{ApiClientConfig, N8nApiClient, API_KEY_HEADER};
pub use types::{
    ExecutionStatus, ListExecutionsOptions, ListWorkflowsOptions, NodeConnection, Workflow,
    WorkflowNode, WorkflowSettings,
};
