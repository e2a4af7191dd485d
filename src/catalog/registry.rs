//! Node Catalog
//!
//! Cached registry of the node types known to the n8n instance. The cache is
//! refreshed from a [`NodeCatalogSource`] once its freshness window elapses,
//! and at most one fetch is in flight at any time: concurrent callers attach
//! to the pending load and observe its single outcome.
//!
//! A failed refresh never discards cached data. When nothing was ever
//! loaded, a fixed fallback list is installed instead so validation keeps
//! working while the instance is unreachable.

use crate::catalog::events::CatalogEvent;
use crate::catalog::fallback::fallback_nodes;
use crate::catalog::metrics::{CatalogStats, CatalogStatsSnapshot};
use crate::catalog::similarity::best_match;
use crate::domain::ports::{
    ClockRef, InvalidNode, NodeCatalogSourceRef, NodeDescriptor, SystemClock, ValidationResult,
};
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

// =============================================================================
// Constants
// =============================================================================

/// Default time after which the catalog is refreshed on next access
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Ordered map of node name to descriptor
pub type NodeMap = IndexMap<String, NodeDescriptor>;

type SharedLoad = Shared<BoxFuture<'static, ()>>;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the node catalog
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// How long a successful (or fallback) load stays fresh
    pub freshness_window: Duration,
    /// Node types installed when nothing could ever be loaded
    pub fallback_nodes: Vec<NodeDescriptor>,
    /// Event channel capacity
    pub event_channel_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            fallback_nodes: fallback_nodes(),
            event_channel_capacity: 64,
        }
    }
}

// =============================================================================
// Internal State
// =============================================================================

#[derive(Debug, Default)]
struct CatalogState {
    /// Swapped whole on every load, never mutated in place
    nodes: Arc<NodeMap>,
    last_fetch: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct LoadState {
    in_flight: Option<SharedLoad>,
    generation: u64,
}

struct CatalogInner {
    source: NodeCatalogSourceRef,
    clock: ClockRef,
    config: CatalogConfig,
    state: RwLock<CatalogState>,
    load: Mutex<LoadState>,
    stats: CatalogStats,
    event_tx: broadcast::Sender<CatalogEvent>,
}

/// Clears the in-flight marker when the load it belongs to ends, however it ends.
struct InFlightGuard {
    inner: Arc<CatalogInner>,
    generation: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut load = self.inner.load.lock();
        if load.generation == self.generation {
            load.in_flight = None;
        }
    }
}

impl CatalogInner {
    fn is_fresh(&self) -> bool {
        let state = self.state.read();
        if state.nodes.is_empty() {
            return false;
        }
        match state.last_fetch {
            Some(last_fetch) => {
                let elapsed = self.clock.now().signed_duration_since(last_fetch);
                // A clock that moved backwards still counts as fresh
                elapsed
                    .to_std()
                    .map(|elapsed| elapsed < self.config.freshness_window)
                    .unwrap_or(true)
            }
            None => false,
        }
    }

    fn emit_event(&self, event: CatalogEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn load_registry(&self) {
        let source = self.source.name().to_string();
        self.stats.record_load_started();
        debug!(source = %source, "Fetching node catalog");

        match self.source.fetch_nodes().await {
            Ok(nodes) => {
                let nodes: NodeMap = nodes
                    .into_iter()
                    .map(|node| (node.name.clone(), node))
                    .collect();
                let node_count = nodes.len();

                {
                    let mut state = self.state.write();
                    state.nodes = Arc::new(nodes);
                    state.last_fetch = Some(self.clock.now());
                }

                self.stats.record_load_succeeded();
                info!(source = %source, node_count, "Node catalog loaded");
                self.emit_event(CatalogEvent::Loaded { source, node_count });
            }
            Err(e) => {
                self.stats.record_load_failed();
                if e.is_transient() {
                    warn!(source = %source, error = %e, "Node catalog source unavailable");
                } else {
                    error!(source = %source, error = %e, "Error fetching node catalog");
                }

                let mut state = self.state.write();
                if state.nodes.is_empty() {
                    warn!("Using fallback node list. This may not match your n8n instance.");
                    let nodes: NodeMap = self
                        .config
                        .fallback_nodes
                        .iter()
                        .map(|node| (node.name.clone(), node.clone()))
                        .collect();
                    let node_count = nodes.len();
                    state.nodes = Arc::new(nodes);
                    state.last_fetch = Some(self.clock.now());
                    drop(state);

                    self.stats.record_fallback_install();
                    self.emit_event(CatalogEvent::FallbackInstalled {
                        source,
                        reason: e.to_string(),
                        node_count,
                    });
                } else {
                    // Keep serving the cached list; last_fetch stays put so the next access retries
                    let retained_nodes = state.nodes.len();
                    drop(state);

                    warn!(retained_nodes, "Keeping previously loaded node catalog");
                    self.emit_event(CatalogEvent::LoadFailed {
                        source,
                        reason: e.to_string(),
                        retained_nodes,
                    });
                }
            }
        }
    }
}

// =============================================================================
// Node Catalog
// =============================================================================

/// Validation and suggestion service for n8n node types
#[derive(Clone)]
pub struct NodeCatalog {
    inner: Arc<CatalogInner>,
}

impl std::fmt::Debug for NodeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeCatalog")
            .field("source", &self.inner.source.name())
            .field("node_count", &self.node_count())
            .field("is_fetching", &self.is_fetching())
            .finish()
    }
}

impl NodeCatalog {
    /// Create a new node catalog
    pub fn new(source: NodeCatalogSourceRef, clock: ClockRef, config: CatalogConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));

        Self {
            inner: Arc::new(CatalogInner {
                source,
                clock,
                config,
                state: RwLock::new(CatalogState::default()),
                load: Mutex::new(LoadState::default()),
                stats: CatalogStats::default(),
                event_tx,
            }),
        }
    }

    /// Create a catalog using the system clock and default configuration
    pub fn with_source(source: NodeCatalogSourceRef) -> Self {
        Self::new(source, Arc::new(SystemClock), CatalogConfig::default())
    }

    /// Subscribe to catalog events
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Make sure the catalog is loaded and fresh.
    ///
    /// Joins the pending load if one is in flight, returns immediately when
    /// the cache is fresh, and otherwise starts a load and waits for it.
    pub async fn ensure_loaded(&self) {
        let load = {
            let mut load = self.inner.load.lock();
            if let Some(in_flight) = load.in_flight.as_ref() {
                in_flight.clone()
            } else if self.inner.is_fresh() {
                self.inner.stats.record_cache_hit();
                return;
            } else {
                load.generation = load.generation.wrapping_add(1);
                let shared = self.start_load(load.generation);
                load.in_flight = Some(shared.clone());
                shared
            }
        };

        load.await;
    }

    /// Spawn the load so it runs to completion even if every waiter goes away.
    fn start_load(&self, generation: u64) -> SharedLoad {
        let guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
            generation,
        };

        let handle = tokio::spawn(async move {
            let guard = guard;
            guard.inner.load_registry().await;
        });

        handle.map(|_| ()).boxed().shared()
    }

    /// Validate a single node type, suggesting the closest known one on a miss
    pub async fn validate(&self, node_type: &str) -> ValidationResult {
        self.ensure_loaded().await;
        let nodes = self.snapshot();

        if nodes.contains_key(node_type) {
            self.inner.stats.record_validation(false);
            return ValidationResult::valid();
        }

        let suggestion = best_match(node_type, nodes.keys().map(String::as_str)).map(str::to_string);
        self.inner.stats.record_validation(suggestion.is_some());
        ValidationResult::invalid(suggestion)
    }

    /// Validate many node types, returning the invalid ones in input order
    pub async fn validate_many<I, S>(&self, node_types: I) -> Vec<InvalidNode>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut invalid = Vec::new();

        for node_type in node_types {
            let node_type = node_type.as_ref();
            let result = self.validate(node_type).await;
            if !result.valid {
                invalid.push(InvalidNode {
                    node_type: node_type.to_string(),
                    suggestion: result.suggestion,
                });
            }
        }

        invalid
    }

    /// All known node type names, in load order
    pub async fn list_types(&self) -> Vec<String> {
        self.ensure_loaded().await;
        self.snapshot().keys().cloned().collect()
    }

    /// All known node descriptors, in load order
    pub async fn list_descriptors(&self) -> Vec<NodeDescriptor> {
        self.ensure_loaded().await;
        self.snapshot().values().cloned().collect()
    }

    /// Current registry without triggering a refresh
    pub fn snapshot(&self) -> Arc<NodeMap> {
        Arc::clone(&self.inner.state.read().nodes)
    }

    /// Number of node types currently cached
    pub fn node_count(&self) -> usize {
        self.inner.state.read().nodes.len()
    }

    /// Time of the last successful or fallback load
    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        self.inner.state.read().last_fetch
    }

    /// Check if a load is currently in flight
    pub fn is_fetching(&self) -> bool {
        self.inner.load.lock().in_flight.is_some()
    }

    /// Configured freshness window
    pub fn freshness_window(&self) -> Duration {
        self.inner.config.freshness_window
    }

    /// Get catalog statistics
    pub fn stats(&self) -> CatalogStatsSnapshot {
        self.inner.stats.snapshot()
    }
}

/// Sort by name, keeping nodes whose package prefix matches `category` ignoring case
pub fn nodes_in_category(
    mut nodes: Vec<NodeDescriptor>,
    category: Option<&str>,
) -> Vec<NodeDescriptor> {
    if let Some(category) = category.filter(|c| !c.is_empty()) {
        nodes.retain(|node| node.category().eq_ignore_ascii_case(category));
    }
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    nodes
}
