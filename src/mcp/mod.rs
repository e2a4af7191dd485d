//! MCP (Model Context Protocol) surface
//!
//! Tools:
//! - workflows: `list_workflows`, `create_workflow`, `get_workflow`,
//!   `update_workflow`, `delete_workflow`, `activate_workflow`,
//!   `deactivate_workflow`
//! - executions: `list_executions`, `get_execution`, `delete_execution`
//! - node catalog: `list_available_nodes`, `validate_workflow_nodes`
//!
//! Resources: `n8n://workflows`, plus the templates `n8n://workflows/{id}`
//! and `n8n://executions/{id}`.

pub mod params;
pub mod resources;
pub mod server;

pub use resources::ResourceUri;
pub use server::{create_mcp_router, serve_stdio, WorkflowBuilderServer};
