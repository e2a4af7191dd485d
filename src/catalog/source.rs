//! Node Catalog Sources
//!
//! Decoding of the n8n `/node-types` payload, plus a fixed in-memory source.

use crate::domain::ports::{NodeCatalogSource, NodeDescriptor};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Decode a `{ "data": [ ... ] }` node-types payload.
///
/// Entries without a non-empty string `name` are skipped. A missing or
/// non-array `data` field decodes to an empty list.
pub fn parse_node_types(body: &Value) -> Vec<NodeDescriptor> {
    let Some(items) = body.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let name = non_empty_str(item.get("name"))?;
            let display_name = non_empty_str(item.get("displayName")).unwrap_or(name);

            Some(NodeDescriptor {
                name: name.to_string(),
                display_name: display_name.to_string(),
                description: item
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                node_type: item.get("type").and_then(Value::as_str).map(str::to_string),
                version: item.get("version").and_then(Value::as_i64),
            })
        })
        .collect()
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

// =============================================================================
// Static Source
// =============================================================================

/// Source that always returns the same node list
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    nodes: Vec<NodeDescriptor>,
}

impl StaticCatalogSource {
    pub fn new(nodes: Vec<NodeDescriptor>) -> Self {
        Self { nodes }
    }
}

#[async_trait]
impl NodeCatalogSource for StaticCatalogSource {
    async fn fetch_nodes(&self) -> Result<Vec<NodeDescriptor>> {
        Ok(self.nodes.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_entries() {
        let body = json!({
            "data": [
                {
                    "name": "n8n-nodes-base.httpRequest",
                    "displayName": "HTTP Request",
                    "description": "Makes an HTTP request",
                    "type": "action",
                    "version": 4
                },
                { "name": "n8n-nodes-base.set" }
            ]
        });

        let nodes = parse_node_types(&body);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].display_name, "HTTP Request");
        assert_eq!(nodes[0].description.as_deref(), Some("Makes an HTTP request"));
        assert_eq!(nodes[0].node_type.as_deref(), Some("action"));
        assert_eq!(nodes[0].version, Some(4));

        // Display name defaults to the node name
        assert_eq!(nodes[1].display_name, "n8n-nodes-base.set");
        assert_eq!(nodes[1].version, None);
    }

    #[test]
    fn test_parse_skips_entries_without_name() {
        let body = json!({
            "data": [
                { "displayName": "Nameless" },
                { "name": "" },
                { "name": 42 },
                "not-an-object",
                { "name": "n8n-nodes-base.if", "displayName": "" }
            ]
        });

        let nodes = parse_node_types(&body);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "n8n-nodes-base.if");
        assert_eq!(nodes[0].display_name, "n8n-nodes-base.if");
    }

    #[test]
    fn test_parse_missing_or_non_array_data() {
        assert!(parse_node_types(&json!({})).is_empty());
        assert!(parse_node_types(&json!({ "data": {} })).is_empty());
        assert!(parse_node_types(&json!(null)).is_empty());
        assert!(parse_node_types(&json!({ "data": [] })).is_empty());
    }

    #[test]
    fn test_parse_non_integer_version() {
        let body = json!({ "data": [ { "name": "a.b", "version": 1.5 } ] });
        let nodes = parse_node_types(&body);
        assert_eq!(nodes[0].version, None);
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticCatalogSource::new(vec![NodeDescriptor::new("a.b", "B")]);
        let nodes = source.fetch_nodes().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(source.name(), "static");
    }
}
