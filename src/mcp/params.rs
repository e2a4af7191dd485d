//! Tool parameter types

use crate::client::types::{ExecutionStatus, ListExecutionsOptions, ListWorkflowsOptions, Workflow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for list_workflows.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListWorkflowsParams {
    /// Filter by active status
    #[serde(default)]
    pub active: Option<bool>,
    /// Filter by tags (comma-separated)
    #[serde(default)]
    pub tags: Option<String>,
    /// Filter by workflow name
    #[serde(default)]
    pub name: Option<String>,
}

impl From<ListWorkflowsParams> for ListWorkflowsOptions {
    fn from(params: ListWorkflowsParams) -> Self {
        Self {
            active: params.active,
            tags: params.tags,
            name: params.name,
        }
    }
}

/// Parameters for create_workflow.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateWorkflowParams {
    /// Complete workflow structure including nodes, connections, and settings
    pub workflow: Workflow,
    /// Whether to activate the workflow after creation (only works for workflows with automatic triggers)
    #[serde(default)]
    pub activate: Option<bool>,
}

/// Parameters for tools addressing one workflow.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowIdParams {
    /// ID of the workflow - can be obtained from list_workflows
    pub id: String,
}

/// Parameters for update_workflow.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateWorkflowParams {
    /// ID of the workflow to update - can be obtained from list_workflows
    pub id: String,
    /// Complete updated workflow structure - must include all nodes and connections, not just changes
    pub workflow: Workflow,
}

/// Parameters for list_executions.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListExecutionsParams {
    /// Filter by workflow ID
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// Filter by execution status
    #[serde(default)]
    pub status: Option<ExecutionStatus>,
    /// Maximum number of executions to return
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<ListExecutionsParams> for ListExecutionsOptions {
    fn from(params: ListExecutionsParams) -> Self {
        Self {
            workflow_id: params.workflow_id,
            status: params.status,
            limit: params.limit,
        }
    }
}

/// Parameters for get_execution.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetExecutionParams {
    /// ID of the execution - can be obtained from list_executions
    pub id: String,
    /// Whether to include the full execution data
    #[serde(default)]
    pub include_data: Option<bool>,
}

/// Parameters for delete_execution.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionIdParams {
    /// ID of the execution to delete - can be obtained from list_executions
    pub id: String,
}

/// Parameters for list_available_nodes.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListAvailableNodesParams {
    /// Only list nodes of this package, e.g. `n8n-nodes-base` (case-insensitive)
    #[serde(default)]
    pub category: Option<String>,
}

/// Parameters for validate_workflow_nodes.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ValidateWorkflowNodesParams {
    /// Workflow JSON; the `type` of every entry in `nodes` is checked
    pub workflow: Value,
}

impl ValidateWorkflowNodesParams {
    /// Node types of the workflow draft. Nodes without a string `type` are skipped.
    pub fn node_types(&self) -> Vec<&str> {
        self.workflow
            .get("nodes")
            .and_then(Value::as_array)
            .map(|nodes| {
                nodes
                    .iter()
                    .filter_map(|node| node.get("type").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_execution_params_use_camel_case() {
        let params: ListExecutionsParams =
            serde_json::from_value(json!({ "workflowId": "9", "status": "success", "limit": 5 }))
                .unwrap();
        let options = ListExecutionsOptions::from(params);
        assert_eq!(options.workflow_id.as_deref(), Some("9"));
        assert_eq!(options.status, Some(ExecutionStatus::Success));
        assert_eq!(options.limit, Some(5));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = serde_json::from_value::<ListExecutionsParams>(json!({ "status": "running" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_draft_node_types() {
        let params = ValidateWorkflowNodesParams {
            workflow: json!({
                "nodes": [
                    { "type": "n8n-nodes-base.set" },
                    { "name": "untyped" },
                    { "type": 3 },
                    { "type": "n8n-nodes-base.iff" }
                ]
            }),
        };
        assert_eq!(
            params.node_types(),
            vec!["n8n-nodes-base.set", "n8n-nodes-base.iff"]
        );

        let params = ValidateWorkflowNodesParams { workflow: json!({}) };
        assert!(params.node_types().is_empty());
    }
}
