//! n8n REST API Client
//!
//! Thin JSON proxy over the n8n public API (`{host}/api/v1`). Responses are
//! returned as `serde_json::Value`; callers decide how to present them.
//!
//! The client also serves as the node catalog's remote source, reading the
//! editor's `{host}/node-types` endpoint.

use crate::catalog::source::parse_node_types;
use crate::client::types::{ListExecutionsOptions, ListWorkflowsOptions, Workflow};
use crate::domain::ports::{NodeCatalogSource, NodeDescriptor};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the n8n API key
pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the n8n API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the n8n instance, without the `/api/v1` suffix
    pub base_url: String,
    /// API key sent as `X-N8N-API-KEY`; empty keys are not sent
    pub api_key: Option<String>,
    /// Timeout applied to every request, including node-type fetches
    pub request_timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5678".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for the n8n REST API
#[derive(Debug, Clone)]
pub struct N8nApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl N8nApiClient {
    /// Create a new client
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Configuration("n8n base URL must not be empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Base URL of the n8n instance
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn build_request(
        &self,
        method: Method,
        url: String,
        query: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Request> {
        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        Ok(builder.build()?)
    }

    async fn execute(&self, request: reqwest::Request) -> Result<Value> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(method = %method, url = %url, "n8n API request");

        let response = self.http.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(method = %method, url = %url, status = status.as_u16(), "n8n API error");
            return Err(Error::RemoteApi {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Map::new()));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let request = self.build_request(method, self.api_url(path), query, body)?;
        self.execute(request).await
    }

    // =========================================================================
    // Workflows
    // =========================================================================

    /// List workflows, unwrapping the `data` envelope
    pub async fn list_workflows(&self, options: &ListWorkflowsOptions) -> Result<Value> {
        let response = self
            .call(Method::GET, "/workflows", &options.query_pairs(), None)
            .await?;
        Ok(unwrap_data(response))
    }

    /// Create a workflow, optionally activating it afterwards
    pub async fn create_workflow(&self, workflow: &Workflow, activate: bool) -> Result<Value> {
        let body = serde_json::to_value(workflow)?;
        let mut created = self.call(Method::POST, "/workflows", &[], Some(&body)).await?;

        if activate {
            let id = created.get("id").and_then(id_string);
            if let Some(id) = id {
                self.activate_workflow(&id).await?;
                if let Some(object) = created.as_object_mut() {
                    object.insert("active".to_string(), Value::Bool(true));
                }
            }
        }

        Ok(created)
    }

    pub async fn get_workflow(&self, id: &str) -> Result<Value> {
        self.call(Method::GET, &workflow_path(id, ""), &[], None).await
    }

    /// Replace a workflow; the full document must be supplied
    pub async fn update_workflow(&self, id: &str, workflow: &Workflow) -> Result<Value> {
        let body = serde_json::to_value(workflow)?;
        self.call(Method::PUT, &workflow_path(id, ""), &[], Some(&body))
            .await
    }

    pub async fn delete_workflow(&self, id: &str) -> Result<Value> {
        self.call(Method::DELETE, &workflow_path(id, ""), &[], None)
            .await
    }

    pub async fn activate_workflow(&self, id: &str) -> Result<Value> {
        self.call(Method::POST, &workflow_path(id, "/activate"), &[], None)
            .await
    }

    pub async fn deactivate_workflow(&self, id: &str) -> Result<Value> {
        self.call(Method::POST, &workflow_path(id, "/deactivate"), &[], None)
            .await
    }

    // =========================================================================
    // Executions
    // =========================================================================

    /// List executions, unwrapping the `data` envelope
    pub async fn list_executions(&self, options: &ListExecutionsOptions) -> Result<Value> {
        let response = self
            .call(Method::GET, "/executions", &options.query_pairs(), None)
            .await?;
        Ok(unwrap_data(response))
    }

    pub async fn get_execution(&self, id: &str, include_data: Option<bool>) -> Result<Value> {
        let query: Vec<_> = include_data
            .map(|include| ("includeData", include.to_string()))
            .into_iter()
            .collect();
        self.call(Method::GET, &execution_path(id), &query, None)
            .await
    }

    pub async fn delete_execution(&self, id: &str) -> Result<Value> {
        self.call(Method::DELETE, &execution_path(id), &[], None)
            .await
    }

    // =========================================================================
    // Node Types
    // =========================================================================

    fn node_types_request(&self) -> Result<reqwest::Request> {
        self.build_request(
            Method::GET,
            format!("{}/node-types", self.base_url),
            &[],
            None,
        )
    }
}

#[async_trait]
impl NodeCatalogSource for N8nApiClient {
    async fn fetch_nodes(&self) -> Result<Vec<NodeDescriptor>> {
        let request = self.node_types_request()?;
        let body = match self.execute(request).await {
            Ok(body) => body,
            Err(Error::JsonParse(e)) => return Err(Error::CatalogResponseParse(e.to_string())),
            Err(e) => return Err(e),
        };
        Ok(parse_node_types(&body))
    }

    fn name(&self) -> &str {
        "n8n"
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn workflow_path(id: &str, suffix: &str) -> String {
    format!("/workflows/{}{}", urlencoding::encode(id), suffix)
}

fn execution_path(id: &str) -> String {
    format!("/executions/{}", urlencoding::encode(id))
}

/// n8n wraps list responses as `{ "data": [...], "nextCursor": ... }`
fn unwrap_data(response: Value) -> Value {
    match response {
        Value::Object(mut object) => match object.remove("data") {
            Some(data) if !data.is_null() => data,
            Some(data) => {
                object.insert("data".to_string(), data);
                Value::Object(object)
            }
            None => Value::Object(object),
        },
        other => other,
    }
}

/// Workflow ids are strings in recent n8n versions and numbers in older ones
fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::ExecutionStatus;
    use assert_matches::assert_matches;
    use axum::extract::{Path, Query};
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn client(base_url: &str, api_key: Option<&str>) -> N8nApiClient {
        N8nApiClient::new(ApiClientConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_n8n(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_rejects_empty_base_url() {
        let result = N8nApiClient::new(ApiClientConfig {
            base_url: "/".into(),
            ..Default::default()
        });
        assert_matches!(result, Err(Error::Configuration(_)));
    }

    #[test]
    fn test_request_urls_and_headers() {
        let client = client("http://n8n.local:5678/", Some("secret"));
        assert_eq!(client.base_url(), "http://n8n.local:5678");

        let request = client
            .build_request(
                Method::GET,
                client.api_url(&workflow_path("a/b c", "/activate")),
                &[],
                None,
            )
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://n8n.local:5678/api/v1/workflows/a%2Fb%20c/activate"
        );
        assert_eq!(request.headers()[API_KEY_HEADER], "secret");
        assert_eq!(request.headers()[ACCEPT], "application/json");

        let request = client.node_types_request().unwrap();
        assert_eq!(request.url().as_str(), "http://n8n.local:5678/node-types");
    }

    #[test]
    fn test_query_string_encoding() {
        let client = client("http://n8n.local", None);
        let options = ListExecutionsOptions {
            workflow_id: Some("7".into()),
            status: Some(ExecutionStatus::Error),
            limit: Some(20),
        };
        let request = client
            .build_request(
                Method::GET,
                client.api_url("/executions"),
                &options.query_pairs(),
                None,
            )
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://n8n.local/api/v1/executions?workflowId=7&status=error&limit=20"
        );
        assert!(request.headers().get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn test_empty_api_key_not_sent() {
        let client = client("http://n8n.local", Some(""));
        let request = client.node_types_request().unwrap();
        assert!(request.headers().get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn test_unwrap_data() {
        assert_eq!(unwrap_data(json!({ "data": [1, 2] })), json!([1, 2]));
        assert_eq!(
            unwrap_data(json!({ "data": null, "x": 1 })),
            json!({ "data": null, "x": 1 })
        );
        assert_eq!(unwrap_data(json!([3])), json!([3]));
    }

    #[tokio::test]
    async fn test_list_workflows_against_fake_n8n() {
        let router = Router::new().route(
            "/api/v1/workflows",
            get(
                |headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                    assert_eq!(headers[API_KEY_HEADER], "k");
                    Json(json!({
                        "data": [ { "id": "1", "name": "A", "active": query.get("active") == Some(&"true".to_string()) } ],
                        "nextCursor": null
                    }))
                },
            ),
        );
        let client = client(&spawn_n8n(router).await, Some("k"));

        let workflows = client
            .list_workflows(&ListWorkflowsOptions {
                active: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(workflows, json!([ { "id": "1", "name": "A", "active": true } ]));
    }

    #[tokio::test]
    async fn test_create_with_activation() {
        let router = Router::new()
            .route(
                "/api/v1/workflows",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({ "id": "wf-1", "name": body["name"], "active": false }))
                }),
            )
            .route(
                "/api/v1/workflows/:id/activate",
                post(|Path(id): Path<String>| async move {
                    Json(json!({ "id": id, "active": true }))
                }),
            );
        let client = client(&spawn_n8n(router).await, None);

        let workflow: Workflow = serde_json::from_value(json!({
            "name": "Ping",
            "nodes": [],
            "connections": {}
        }))
        .unwrap();

        let created = client.create_workflow(&workflow, true).await.unwrap();
        assert_eq!(created["id"], "wf-1");
        assert_eq!(created["name"], "Ping");
        assert_eq!(created["active"], true);
    }

    #[tokio::test]
    async fn test_error_status_and_no_content() {
        let router = Router::new()
            .route(
                "/api/v1/workflows/:id",
                get(|| async { (axum::http::StatusCode::NOT_FOUND, "Not Found") })
                    .delete(|| async { axum::http::StatusCode::NO_CONTENT }),
            );
        let client = client(&spawn_n8n(router).await, None);

        let err = client.get_workflow("missing").await.unwrap_err();
        assert_matches!(err, Error::RemoteApi { status: 404, ref body } if body == "Not Found");

        assert_eq!(client.delete_workflow("x").await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_fetch_nodes() {
        let router = Router::new().route(
            "/node-types",
            get(|| async {
                Json(json!({
                    "data": [
                        { "name": "n8n-nodes-base.set", "displayName": "Set", "version": 3 },
                        { "displayName": "no name" }
                    ]
                }))
            }),
        );
        let client = client(&spawn_n8n(router).await, None);

        let nodes = client.fetch_nodes().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "n8n-nodes-base.set");
        assert_eq!(nodes[0].version, Some(3));
    }

    #[tokio::test]
    async fn test_fetch_nodes_malformed_body() {
        let router = Router::new().route("/node-types", get(|| async { "<html>login</html>" }));
        let client = client(&spawn_n8n(router).await, None);

        assert_matches!(client.fetch_nodes().await, Err(Error::CatalogResponseParse(_)));
    }
}
