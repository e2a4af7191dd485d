//! MCP resources for n8n workflows and executions.

use crate::error::{Error, Result};
use rmcp::model::{
    AnnotateAble, ListResourceTemplatesResult, ListResourcesResult, RawResource,
    RawResourceTemplate, ReadResourceResult, ResourceContents,
};

pub const WORKFLOWS_URI: &str = "n8n://workflows";
const WORKFLOW_URI_PREFIX: &str = "n8n://workflows/";
const EXECUTION_URI_PREFIX: &str = "n8n://executions/";
const JSON_MIME: &str = "application/json";

/// A parsed `n8n://` resource URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    Workflows,
    Workflow(String),
    Execution(String),
}

impl ResourceUri {
    pub fn parse(uri: &str) -> Result<Self> {
        if uri == WORKFLOWS_URI {
            return Ok(ResourceUri::Workflows);
        }
        if let Some(id) = uri.strip_prefix(WORKFLOW_URI_PREFIX).filter(|id| !id.is_empty()) {
            return Ok(ResourceUri::Workflow(id.to_string()));
        }
        if let Some(id) = uri.strip_prefix(EXECUTION_URI_PREFIX).filter(|id| !id.is_empty()) {
            return Ok(ResourceUri::Execution(id.to_string()));
        }
        Err(Error::InvalidResourceUri(uri.to_string()))
    }

    /// Short label used in error messages
    pub fn describe(&self) -> String {
        match self {
            ResourceUri::Workflows => "workflows".to_string(),
            ResourceUri::Workflow(id) => format!("workflow {}", id),
            ResourceUri::Execution(id) => format!("execution {}", id),
        }
    }
}

pub fn list_resources() -> ListResourcesResult {
    let resources = vec![RawResource {
        uri: WORKFLOWS_URI.to_string(),
        name: "n8n Workflows".to_string(),
        title: None,
        description: Some("List of all workflows in n8n".to_string()),
        mime_type: Some(JSON_MIME.to_string()),
        size: None,
        icons: None,
        meta: None,
    }
    .no_annotation()];

    ListResourcesResult::with_all_items(resources)
}

pub fn list_resource_templates() -> ListResourceTemplatesResult {
    let templates = vec![
        template(
            "n8n://workflows/{id}",
            "n8n Workflow",
            "Details of a specific n8n workflow",
        ),
        template(
            "n8n://executions/{id}",
            "n8n Execution",
            "Details of a specific n8n workflow execution",
        ),
    ];

    ListResourceTemplatesResult::with_all_items(templates)
}

fn template(
    uri_template: &str,
    name: &str,
    description: &str,
) -> rmcp::model::ResourceTemplate {
    RawResourceTemplate {
        uri_template: uri_template.to_string(),
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        mime_type: Some(JSON_MIME.to_string()),
        icons: None,
    }
    .no_annotation()
}

pub fn json_resource(uri: &str, text: String) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri: uri.to_string(),
            mime_type: Some(JSON_MIME.to_string()),
            text,
            meta: None,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_resource_uri() {
        assert_eq!(ResourceUri::parse("n8n://workflows").unwrap(), ResourceUri::Workflows);
        assert_eq!(
            ResourceUri::parse("n8n://workflows/abc").unwrap(),
            ResourceUri::Workflow("abc".into())
        );
        assert_eq!(
            ResourceUri::parse("n8n://executions/17").unwrap(),
            ResourceUri::Execution("17".into())
        );
    }

    #[test]
    fn test_parse_rejects_unknown_uris() {
        for uri in ["n8n://workflows/", "n8n://credentials/1", "file:///etc/passwd", ""] {
            assert_matches!(ResourceUri::parse(uri), Err(Error::InvalidResourceUri(_)));
        }
    }

    #[test]
    fn test_listings() {
        let resources = list_resources();
        assert_eq!(resources.resources.len(), 1);
        assert_eq!(resources.resources[0].raw.uri, WORKFLOWS_URI);

        let templates = list_resource_templates();
        assert_eq!(templates.resource_templates.len(), 2);
        assert_eq!(templates.resource_templates[1].raw.uri_template, "n8n://executions/{id}");
    }
}
