//! Domain Ports - Core trait definitions for the workflow builder
//!
//! These traits define the boundaries between the node catalog and the
//! systems it depends on. Adapters implement these traits to provide
//! concrete functionality.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Node Types
// =============================================================================

/// A node type known to the n8n instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Unique identifier, e.g. `n8n-nodes-base.httpRequest`
    pub name: String,
    /// Human readable label
    pub display_name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Upstream node kind
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Node version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl NodeDescriptor {
    /// Create a descriptor with only a name and display name
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: None,
            node_type: None,
            version: None,
        }
    }

    /// Category of the node, i.e. the package prefix before the first `.`
    pub fn category(&self) -> &str {
        match self.name.split_once('.') {
            Some((package, _)) => package,
            None => "other",
        }
    }
}

/// Outcome of validating a single node type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            suggestion: None,
        }
    }

    pub fn invalid(suggestion: Option<String>) -> Self {
        Self {
            valid: false,
            suggestion,
        }
    }
}

/// An invalid node type reported by batch validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidNode {
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

// =============================================================================
// Node Catalog Source Port
// =============================================================================

/// Port for fetching the list of node types from the remote instance
#[async_trait]
pub trait NodeCatalogSource: Send + Sync {
    /// Fetch every node type the instance knows about.
    ///
    /// An empty vector is a legitimate answer, not a failure.
    async fn fetch_nodes(&self) -> Result<Vec<NodeDescriptor>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

// =============================================================================
// Clock Port
// =============================================================================

/// Source of wall-clock time for freshness decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type NodeCatalogSourceRef = Arc<dyn NodeCatalogSource>;
pub type ClockRef = Arc<dyn Clock>;
