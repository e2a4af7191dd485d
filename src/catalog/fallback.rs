//! Fallback Node Types
//!
//! Well-known node types installed when the n8n instance cannot be reached
//! and no catalog has ever been loaded. This list may not match the actual
//! instance.

use crate::domain::ports::NodeDescriptor;

/// `(name, display_name)` pairs of the fallback dataset
pub const FALLBACK_NODE_TYPES: &[(&str, &str)] = &[
    ("n8n-nodes-base.start", "Start"),
    ("n8n-nodes-base.manualTrigger", "Manual Trigger"),
    ("n8n-nodes-base.httpRequest", "HTTP Request"),
    ("n8n-nodes-base.set", "Set"),
    ("n8n-nodes-base.function", "Function"),
    ("n8n-nodes-base.if", "IF"),
    ("n8n-nodes-base.switch", "Switch"),
    ("n8n-nodes-base.merge", "Merge"),
];

/// Build descriptors for the fallback dataset
pub fn fallback_nodes() -> Vec<NodeDescriptor> {
    FALLBACK_NODE_TYPES
        .iter()
        .map(|(name, display_name)| NodeDescriptor::new(*name, *display_name))
        .collect()
}
