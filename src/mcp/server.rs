//! MCP server exposing n8n workflows, executions and the node catalog.

use crate::catalog::{nodes_in_category, NodeCatalog};
use crate::client::N8nApiClient;
use crate::domain::ports::InvalidNode;
use crate::error::{Error, Result as CrateResult};
use crate::mcp::params::{
    CreateWorkflowParams, ExecutionIdParams, GetExecutionParams, ListAvailableNodesParams,
    ListExecutionsParams, ListWorkflowsParams, UpdateWorkflowParams, ValidateWorkflowNodesParams,
    WorkflowIdParams,
};
use crate::mcp::resources::{self, ResourceUri};
use axum::Router;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, ErrorData as McpError, Implementation, ListResourceTemplatesResult,
    ListResourcesResult, PaginatedRequestParams, ProtocolVersion, ReadResourceRequestParams,
    ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::{tool, tool_handler, tool_router, RoleServer, ServerHandler, ServiceExt};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const INSTRUCTIONS: &str = "n8n Workflow Builder - manage workflows and executions on an n8n instance. \
Call list_available_nodes before creating workflows and only use the exact node types it returns. \
Use validate_workflow_nodes to check a draft; create_workflow and update_workflow reject unknown node types. \
Workflows with only manual triggers cannot be activated.";

// ============================================================================
// Server
// ============================================================================

/// MCP handler backed by the n8n API client and the node catalog
#[derive(Clone)]
pub struct WorkflowBuilderServer {
    client: Arc<N8nApiClient>,
    catalog: NodeCatalog,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WorkflowBuilderServer {
    pub fn new(client: Arc<N8nApiClient>, catalog: NodeCatalog) -> Self {
        Self {
            client,
            catalog,
            tool_router: Self::tool_router(),
        }
    }

    /// Reject workflows that reference node types the instance does not know.
    async fn check_nodes<'a, I>(&self, node_types: I) -> Option<CallToolResult>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let invalid = self.catalog.validate_many(node_types).await;
        if invalid.is_empty() {
            return None;
        }

        info!(invalid_count = invalid.len(), "Rejected workflow with unknown node types");
        let text = format!(
            "Workflow uses unknown node types. Use list_available_nodes to find valid types.\n{}",
            pretty(&invalid)
        );
        Some(CallToolResult::error(vec![Content::text(text)]))
    }

    #[tool(
        description = "Lists all workflows from n8n with their basic information including ID, name, status, creation date, and tags. Results can be filtered by active status, tags, or name."
    )]
    async fn list_workflows(
        &self,
        Parameters(params): Parameters<ListWorkflowsParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        match self.client.list_workflows(&params.into()).await {
            Ok(workflows) => Ok(json_result(&workflows)),
            Err(e) => Ok(remote_error("listing workflows", &e)),
        }
    }

    #[tool(
        description = "Creates a new workflow in n8n with specified nodes and connections. Node types are checked against the instance first. Only workflows with automatic trigger nodes (schedule, webhook, etc.) can be activated. Returns the created workflow with its assigned ID."
    )]
    async fn create_workflow(
        &self,
        Parameters(params): Parameters<CreateWorkflowParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        if let Some(rejection) = self.check_nodes(params.workflow.node_types()).await {
            return Ok(rejection);
        }

        let activate = params.activate.unwrap_or(false);
        match self.client.create_workflow(&params.workflow, activate).await {
            Ok(workflow) => {
                info!(id = ?workflow.get("id"), activate, "Created workflow via MCP");
                Ok(json_result(&workflow))
            }
            Err(e) => Ok(remote_error("creating workflow", &e)),
        }
    }

    #[tool(
        description = "Retrieves complete details of a specific workflow by its ID, including all nodes, connections, settings, and metadata."
    )]
    async fn get_workflow(
        &self,
        Parameters(params): Parameters<WorkflowIdParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let id = require_id(&params.id, "Workflow ID is required")?;
        match self.client.get_workflow(id).await {
            Ok(workflow) => Ok(json_result(&workflow)),
            Err(e) => Ok(remote_error("retrieving workflow", &e)),
        }
    }

    #[tool(
        description = "Updates an existing workflow with new configuration. The entire workflow structure must be provided, not just the parts being changed."
    )]
    async fn update_workflow(
        &self,
        Parameters(params): Parameters<UpdateWorkflowParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let id = require_id(&params.id, "Workflow ID is required")?;
        if let Some(rejection) = self.check_nodes(params.workflow.node_types()).await {
            return Ok(rejection);
        }

        match self.client.update_workflow(id, &params.workflow).await {
            Ok(workflow) => Ok(json_result(&workflow)),
            Err(e) => Ok(remote_error("updating workflow", &e)),
        }
    }

    #[tool(description = "Permanently deletes a workflow by its ID.")]
    async fn delete_workflow(
        &self,
        Parameters(params): Parameters<WorkflowIdParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let id = require_id(&params.id, "Workflow ID is required")?;
        match self.client.delete_workflow(id).await {
            Ok(deleted) => {
                info!(id, "Deleted workflow via MCP");
                Ok(json_result(&deleted))
            }
            Err(e) => Ok(remote_error("deleting workflow", &e)),
        }
    }

    #[tool(
        description = "Activates a workflow so its triggers start firing. Fails for workflows with only manual triggers."
    )]
    async fn activate_workflow(
        &self,
        Parameters(params): Parameters<WorkflowIdParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let id = require_id(&params.id, "Workflow ID is required")?;
        match self.client.activate_workflow(id).await {
            Ok(workflow) => Ok(json_result(&workflow)),
            Err(e) => Ok(remote_error("activating workflow", &e)),
        }
    }

    #[tool(description = "Deactivates a workflow so its triggers stop firing.")]
    async fn deactivate_workflow(
        &self,
        Parameters(params): Parameters<WorkflowIdParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let id = require_id(&params.id, "Workflow ID is required")?;
        match self.client.deactivate_workflow(id).await {
            Ok(workflow) => Ok(json_result(&workflow)),
            Err(e) => Ok(remote_error("deactivating workflow", &e)),
        }
    }

    #[tool(
        description = "Lists workflow executions, optionally filtered by workflow ID and status (error, success, waiting), with an optional limit."
    )]
    async fn list_executions(
        &self,
        Parameters(params): Parameters<ListExecutionsParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        match self.client.list_executions(&params.into()).await {
            Ok(executions) => Ok(json_result(&executions)),
            Err(e) => Ok(remote_error("listing executions", &e)),
        }
    }

    #[tool(
        description = "Retrieves a specific execution by its ID. Set includeData to return the full execution data."
    )]
    async fn get_execution(
        &self,
        Parameters(params): Parameters<GetExecutionParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let id = require_id(&params.id, "Execution ID is required")?;
        match self.client.get_execution(id, params.include_data).await {
            Ok(execution) => Ok(json_result(&execution)),
            Err(e) => Ok(remote_error("retrieving execution", &e)),
        }
    }

    #[tool(description = "Deletes an execution record by its ID. This cannot be undone.")]
    async fn delete_execution(
        &self,
        Parameters(params): Parameters<ExecutionIdParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let id = require_id(&params.id, "Execution ID is required")?;
        match self.client.delete_execution(id).await {
            Ok(deleted) => {
                info!(id, "Deleted execution via MCP");
                Ok(json_result(&deleted))
            }
            Err(e) => Ok(remote_error("deleting execution", &e)),
        }
    }

    #[tool(
        description = "Lists the node types available on the n8n instance, sorted by name. Use this before creating workflows and only use these exact node types. Optionally filter by category (package prefix such as n8n-nodes-base)."
    )]
    async fn list_available_nodes(
        &self,
        Parameters(params): Parameters<ListAvailableNodesParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let descriptors = self.catalog.list_descriptors().await;
        let total = descriptors.len();
        let nodes = nodes_in_category(descriptors, params.category.as_deref());

        Ok(json_result(&json!({
            "total": total,
            "count": nodes.len(),
            "nodes": nodes,
        })))
    }

    #[tool(
        description = "Checks the node types of a workflow draft against the n8n instance. Returns the unknown node types with the closest valid type as a suggestion."
    )]
    async fn validate_workflow_nodes(
        &self,
        Parameters(params): Parameters<ValidateWorkflowNodesParams>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let invalid: Vec<InvalidNode> = self.catalog.validate_many(params.node_types()).await;

        Ok(json_result(&json!({
            "valid": invalid.is_empty(),
            "invalidNodes": invalid,
        })))
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl ServerHandler for WorkflowBuilderServer {
    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<ListResourcesResult, McpError>> + Send + '_
    {
        std::future::ready(Ok(resources::list_resources()))
    }

    fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<ListResourceTemplatesResult, McpError>>
           + Send
           + '_ {
        std::future::ready(Ok(resources::list_resource_templates()))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<ReadResourceResult, McpError>> + Send + '_
    {
        async move {
            let target = ResourceUri::parse(&request.uri)
                .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
            let value = self.fetch_resource(&target).await.map_err(|e| {
                McpError::internal_error(format!("Failed to fetch {}: {}", target.describe(), e), None)
            })?;
            Ok(resources::json_resource(&request.uri, pretty(&value)))
        }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: crate::NAME.to_string(),
                version: crate::VERSION.to_string(),
                title: Some("n8n Workflow Builder".to_string()),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

impl WorkflowBuilderServer {
    async fn fetch_resource(&self, target: &ResourceUri) -> CrateResult<Value> {
        match target {
            ResourceUri::Workflows => self.client.list_workflows(&Default::default()).await,
            ResourceUri::Workflow(id) => self.client.get_workflow(id).await,
            ResourceUri::Execution(id) => self.client.get_execution(id, None).await,
        }
    }
}

// ============================================================================
// Transports
// ============================================================================

/// Serve MCP over stdin/stdout until the client disconnects
pub async fn serve_stdio(server: WorkflowBuilderServer) -> CrateResult<()> {
    info!("Starting MCP server on stdio");

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| Error::Internal(format!("MCP stdio initialization failed: {}", e)))?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| Error::Internal(format!("MCP stdio service failed: {}", e)))?;

    info!(reason = ?reason, "MCP stdio session ended");
    Ok(())
}

/// Create an axum Router serving MCP over Streamable HTTP at `/mcp`
pub fn create_mcp_router(
    client: Arc<N8nApiClient>,
    catalog: NodeCatalog,
    ct: CancellationToken,
) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(WorkflowBuilderServer::new(client.clone(), catalog.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            cancellation_token: ct,
            ..Default::default()
        },
    );

    info!("MCP server initialized with Streamable HTTP transport");

    Router::new().nest_service("/mcp", service)
}

// ============================================================================
// Helpers
// ============================================================================

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn json_result<T: Serialize + ?Sized>(value: &T) -> CallToolResult {
    CallToolResult::success(vec![Content::text(pretty(value))])
}

fn remote_error(action: &str, error: &Error) -> CallToolResult {
    let status = error.remote_status();
    warn!(action, status, error = %error, "n8n call failed");

    let hint = match status {
        Some(401) | Some(403) => Some("Check that N8N_API_KEY is valid for this instance."),
        Some(404) => Some("The resource does not exist on the n8n instance."),
        _ if error.is_transient() => Some("The n8n instance may be temporarily unavailable; retry later."),
        _ => None,
    };

    let mut text = format!("Error {}: {}", action, error);
    if let Some(hint) = hint {
        text.push('\n');
        text.push_str(hint);
    }
    CallToolResult::error(vec![Content::text(text)])
}

fn require_id<'a>(id: &'a str, message: &str) -> std::result::Result<&'a str, McpError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(McpError::invalid_params(message.to_string(), None));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogConfig, StaticCatalogSource};
    use crate::client::{ApiClientConfig, Workflow};
    use crate::domain::ports::{NodeDescriptor, SystemClock};
    use axum::extract::Path;
    use axum::routing::{delete, get, post};
    use axum::Json;
    use std::time::Duration;

    fn catalog(names: &[&str]) -> NodeCatalog {
        let nodes = names.iter().map(|n| NodeDescriptor::new(*n, *n)).collect();
        NodeCatalog::new(
            Arc::new(StaticCatalogSource::new(nodes)),
            Arc::new(SystemClock),
            CatalogConfig::default(),
        )
    }

    fn client(base_url: &str) -> Arc<N8nApiClient> {
        Arc::new(
            N8nApiClient::new(ApiClientConfig {
                base_url: base_url.to_string(),
                api_key: None,
                request_timeout: Duration::from_secs(5),
            })
            .unwrap(),
        )
    }

    async fn spawn_n8n(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|content| content.as_text())
            .map(|text| text.text.clone())
            .unwrap_or_default()
    }

    fn draft(types: &[&str]) -> Workflow {
        let nodes: Vec<Value> = types
            .iter()
            .enumerate()
            .map(|(i, t)| {
                json!({ "id": i.to_string(), "name": format!("Node {}", i), "type": t, "position": [0.0, 0.0] })
            })
            .collect();
        serde_json::from_value(json!({ "name": "Draft", "nodes": nodes, "connections": {} })).unwrap()
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id(" 12 ", "missing").unwrap(), "12");
        assert!(require_id("  ", "missing").is_err());
    }

    #[tokio::test]
    async fn test_list_available_nodes() {
        let server = WorkflowBuilderServer::new(
            client("http://127.0.0.1:9"),
            catalog(&["n8n-nodes-base.set", "n8n-nodes-base.if", "custom.node"]),
        );

        let result = server
            .list_available_nodes(Parameters(ListAvailableNodesParams {
                category: Some("n8n-nodes-base".into()),
            }))
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["total"], 3);
        assert_eq!(body["count"], 2);
        assert_eq!(body["nodes"][0]["name"], "n8n-nodes-base.if");
    }

    #[tokio::test]
    async fn test_validate_workflow_nodes() {
        let server = WorkflowBuilderServer::new(
            client("http://127.0.0.1:9"),
            catalog(&["n8n-nodes-base.merge", "n8n-nodes-base.set"]),
        );

        let result = server
            .validate_workflow_nodes(Parameters(ValidateWorkflowNodesParams {
                workflow: json!({
                    "nodes": [
                        { "type": "n8n-nodes-base.set" },
                        { "type": "n8n-nodes-base.merg" },
                        { "type": "Foo" }
                    ]
                }),
            }))
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["valid"], false);
        assert_eq!(
            body["invalidNodes"],
            json!([
                { "nodeType": "n8n-nodes-base.merg", "suggestion": "n8n-nodes-base.merge" },
                { "nodeType": "Foo" }
            ])
        );
    }

    #[tokio::test]
    async fn test_create_workflow_rejects_unknown_nodes() {
        // Unroutable upstream: the request must never be sent
        let server = WorkflowBuilderServer::new(
            client("http://127.0.0.1:9"),
            catalog(&["n8n-nodes-base.set"]),
        );

        let result = server
            .create_workflow(Parameters(CreateWorkflowParams {
                workflow: draft(&["n8n-nodes-base.sett"]),
                activate: None,
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("n8n-nodes-base.set"));
    }

    #[tokio::test]
    async fn test_create_workflow_against_fake_n8n() {
        let router = Router::new().route(
            "/api/v1/workflows",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "id": "wf-9", "name": body["name"], "active": false }))
            }),
        );
        let server = WorkflowBuilderServer::new(
            client(&spawn_n8n(router).await),
            catalog(&["n8n-nodes-base.manualTrigger"]),
        );

        let result = server
            .create_workflow(Parameters(CreateWorkflowParams {
                workflow: draft(&["n8n-nodes-base.manualTrigger"]),
                activate: Some(false),
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(false));
        let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["id"], "wf-9");
    }

    #[tokio::test]
    async fn test_remote_failure_is_tool_error() {
        let router = Router::new().route(
            "/api/v1/workflows/:id",
            get(|Path(id): Path<String>| async move {
                (axum::http::StatusCode::NOT_FOUND, format!("workflow {} not found", id))
            }),
        );
        let server = WorkflowBuilderServer::new(client(&spawn_n8n(router).await), catalog(&[]));

        let result = server
            .get_workflow(Parameters(WorkflowIdParams { id: "42".into() }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        let text = text_of(&result);
        assert!(text.starts_with("Error retrieving workflow"));
        assert!(text.contains("404"));
        assert!(text.ends_with("The resource does not exist on the n8n instance."));
    }

    #[test]
    fn test_remote_error_hints() {
        let unauthorized = remote_error(
            "listing workflows",
            &Error::RemoteApi {
                status: 401,
                body: "unauthorized".into(),
            },
        );
        assert!(text_of(&unauthorized).contains("N8N_API_KEY"));

        let unavailable = remote_error(
            "listing workflows",
            &Error::RemoteApi {
                status: 503,
                body: "maintenance".into(),
            },
        );
        assert!(text_of(&unavailable).contains("temporarily unavailable"));

        let rejected = remote_error(
            "creating workflow",
            &Error::RemoteApi {
                status: 400,
                body: "bad request".into(),
            },
        );
        assert_eq!(
            text_of(&rejected),
            "Error creating workflow: n8n API error (400): bad request"
        );
        assert_eq!(rejected.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_delete_execution_against_fake_n8n() {
        let router = Router::new().route(
            "/api/v1/executions/:id",
            delete(|Path(id): Path<String>| async move {
                Json(json!({ "id": id, "finished": true }))
            }),
        );
        let server = WorkflowBuilderServer::new(client(&spawn_n8n(router).await), catalog(&[]));

        let result = server
            .delete_execution(Parameters(ExecutionIdParams { id: " 77 ".into() }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(false));
        let body: Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["id"], "77");

        let blank = server
            .delete_execution(Parameters(ExecutionIdParams { id: "  ".into() }))
            .await;
        assert!(blank.is_err());
    }

    #[tokio::test]
    async fn test_blank_id_is_invalid_params() {
        let server = WorkflowBuilderServer::new(client("http://127.0.0.1:9"), catalog(&[]));

        let result = server
            .delete_workflow(Parameters(WorkflowIdParams { id: String::new() }))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_server_info() {
        let server = WorkflowBuilderServer::new(client("http://127.0.0.1:9"), catalog(&[]));
        let info = server.get_info();
        assert_eq!(info.server_info.name, crate::NAME);
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }
}
