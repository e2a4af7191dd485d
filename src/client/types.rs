//! n8n API Types
//!
//! Query options for list endpoints and the workflow document accepted by
//! the create/update tools. Responses from n8n are passed through as JSON.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// List Options
// =============================================================================

/// Filters for `GET /workflows`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListWorkflowsOptions {
    pub active: Option<bool>,
    /// Comma-separated tag names
    pub tags: Option<String>,
    pub name: Option<String>,
}

impl ListWorkflowsOptions {
    /// Query parameters for the set filters. Empty strings are skipped.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(active) = self.active {
            pairs.push(("active", active.to_string()));
        }
        if let Some(tags) = self.tags.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("tags", tags.to_string()));
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            pairs.push(("name", name.to_string()));
        }
        pairs
    }
}

/// Execution status filter accepted by n8n
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Error,
    Success,
    Waiting,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Error => "error",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Waiting => "waiting",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for `GET /executions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListExecutionsOptions {
    pub workflow_id: Option<String>,
    pub status: Option<ExecutionStatus>,
    /// Zero means "server default"
    pub limit: Option<u32>,
}

impl ListExecutionsOptions {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.workflow_id.as_deref().filter(|id| !id.is_empty()) {
            pairs.push(("workflowId", id.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

// =============================================================================
// Workflow Document
// =============================================================================

/// A workflow as submitted to n8n
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Assigned by n8n; omit when creating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the workflow - use descriptive names for easier identification
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Workflow nodes (triggers, actions, etc.)
    pub nodes: Vec<WorkflowNode>,
    /// Connections keyed by source node name, then by output type
    pub connections: BTreeMap<String, BTreeMap<String, Vec<Vec<NodeConnection>>>>,
    /// Workflow settings like error handling, execution timeout, etc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<WorkflowSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data: Option<Value>,
}

impl Workflow {
    /// Node type identifiers in node order
    pub fn node_types(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.node_type.as_str())
    }
}

/// A single node of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: String,
    pub name: String,
    /// Node type identifier, e.g. `n8n-nodes-base.httpRequest`
    #[serde(rename = "type")]
    pub node_type: String,
    /// Canvas position as `[x, y]`
    pub position: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
}

/// Target of a connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NodeConnection {
    pub node: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_execution_progress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_manual_executions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_data_error_execution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_data_success_execution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_workflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_order: Option<String>,
}
