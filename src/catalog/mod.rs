//! Node Catalog
//!
//! Cached list of node types available on the n8n instance, used to reject
//! unknown node types before a workflow is sent upstream and to suggest the
//! closest known type for typos.
//!
//! # Components
//!
//! - [`NodeCatalog`]: single-flight cached registry with a freshness window
//! - [`similarity`]: Levenshtein-based similarity and best-match search
//! - [`fallback`]: node types installed when nothing could be loaded
//! - [`source`]: payload decoding and a static in-memory source
//! - [`CatalogStats`] / [`CatalogEvent`]: counters and broadcast events

pub mod events;
pub mod fallback;
pub mod metrics;
pub mod registry;
pub mod similarity;
pub mod source;

pub use events::CatalogEvent;
pub use fallback::{fallback_nodes, FALLBACK_NODE_TYPES};
pub use metrics::{CatalogStats, CatalogStatsSnapshot};
pub use registry::{
    nodes_in_category, CatalogConfig, NodeCatalog, NodeMap, DEFAULT_FRESHNESS_WINDOW,
};
pub use similarity::{best_match, levenshtein_distance, similarity, SUGGESTION_THRESHOLD};
pub use source::{parse_node_types, StaticCatalogSource};
