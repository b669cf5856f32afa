//! Expiry and capacity rules for cached lookups

use crate::config::schema::CacheConfig;
use crate::store::Namespace;
use chrono::Duration;
use serde::Serialize;
use std::collections::BTreeMap;

/// TTL and capacity limits applied by the lookup cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Lookup results older than this are treated as missing
    pub ttl: Duration,
    /// Maximum number of compound records kept
    pub max_compounds: usize,
}

impl CachePolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            max_compounds: config.max_compounds,
        }
    }

    /// Capacity bound for a namespace, if it has one
    pub fn capacity(&self, namespace: Namespace) -> Option<usize> {
        match namespace {
            Namespace::CompoundById => Some(self.max_compounds),
            _ => None,
        }
    }

    /// Whether entries in a namespace expire
    pub fn expires(&self, namespace: Namespace) -> bool {
        Namespace::lookup_results().contains(&namespace)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Normalize a compound name into a cache key (trimmed, lowercase)
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Entry counts per namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub counts: BTreeMap<Namespace, usize>,
}

impl CacheStats {
    /// Count for one namespace (zero when absent)
    pub fn count(&self, namespace: Namespace) -> usize {
        self.counts.get(&namespace).copied().unwrap_or(0)
    }

    /// Entries across all namespaces
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}
