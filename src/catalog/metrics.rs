//! Catalog Metrics
//!
//! Lock-free counters for catalog loads and lookups.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the node catalog
#[derive(Debug, Default)]
pub struct CatalogStats {
    /// Fetches issued against the source
    pub loads_started: AtomicU64,
    /// Fetches that returned a node list
    pub loads_succeeded: AtomicU64,
    /// Fetches that failed
    pub loads_failed: AtomicU64,
    /// Times the fallback list was installed
    pub fallback_installs: AtomicU64,
    /// Accesses served from a fresh cache
    pub cache_hits: AtomicU64,
    /// Single node-type validations
    pub validations: AtomicU64,
    /// Validations that produced a suggestion
    pub suggestions: AtomicU64,
}

impl CatalogStats {
    #[inline]
    pub fn record_load_started(&self) {
        self.loads_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_load_succeeded(&self) {
        self.loads_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_load_failed(&self) {
        self.loads_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fallback_install(&self) {
        self.fallback_installs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_validation(&self, suggested: bool) {
        self.validations.fetch_add(1, Ordering::Relaxed);
        if suggested {
            self.suggestions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Create a snapshot of current stats
    pub fn snapshot(&self) -> CatalogStatsSnapshot {
        CatalogStatsSnapshot {
            loads_started: self.loads_started.load(Ordering::Relaxed),
            loads_succeeded: self.loads_succeeded.load(Ordering::Relaxed),
            loads_failed: self.loads_failed.load(Ordering::Relaxed),
            fallback_installs: self.fallback_installs.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            validations: self.validations.load(Ordering::Relaxed),
            suggestions: self.suggestions.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of catalog statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatsSnapshot {
    pub loads_started: u64,
    pub loads_succeeded: u64,
    pub loads_failed: u64,
    pub fallback_installs: u64,
    pub cache_hits: u64,
    pub validations: u64,
    pub suggestions: u64,
}

impl CatalogStatsSnapshot {
    /// Fraction of validations that carried a suggestion
    pub fn suggestion_ratio(&self) -> f64 {
        if self.validations == 0 {
            0.0
        } else {
            self.suggestions as f64 / self.validations as f64
        }
    }
}
