//! Catalog Events
//!
//! Events emitted by the node catalog so external consumers can react to
//! refreshes and degraded loads.

use serde::{Deserialize, Serialize};

/// Events emitted by the node catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogEvent {
    /// The catalog was replaced with a fresh list from the source
    Loaded { source: String, node_count: usize },

    /// A refresh failed and the previously loaded node types were kept
    LoadFailed {
        source: String,
        reason: String,
        retained_nodes: usize,
    },

    /// A refresh failed with nothing cached, so the fallback list was installed
    FallbackInstalled {
        source: String,
        reason: String,
        node_count: usize,
    },
}
