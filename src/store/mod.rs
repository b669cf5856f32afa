//! Durable, namespaced key-value storage for cached lookups
//!
//! Every value lives in a [`Namespace`] and is wrapped in a [`CacheEntry`]
//! carrying its write timestamp. Backends implement [`PersistentStore`]:
//!
//! | Backend | Durability | Use |
//! |---------|------------|-----|
//! | [`MemoryStore`] | process lifetime | tests, ephemeral sessions |
//! | [`FileStore`] | JSON file per namespace | CLI and applications |
//!
//! Entries listed by recency are ordered by `stored_at`, then by the order
//! in which they were written when timestamps tie.

pub mod file;
pub mod memory;
mod table;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{ChemError, ChemResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Independent key spaces of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// Full compound records keyed by canonical id
    CompoundById,
    /// Normalized names mapped to canonical ids
    NameToId,
    /// Records authored by the user
    UserStructures,
    /// Scalar application settings
    Settings,
}

impl Namespace {
    /// All namespaces, in storage order
    pub fn all() -> &'static [Self] {
        &[
            Self::CompoundById,
            Self::NameToId,
            Self::UserStructures,
            Self::Settings,
        ]
    }

    /// Namespaces holding remote lookup results (subject to TTL)
    pub fn lookup_results() -> &'static [Self] {
        &[Self::CompoundById, Self::NameToId]
    }

    /// Stable name, also used for file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompoundById => "compound-by-id",
            Self::NameToId => "name-to-id",
            Self::UserStructures => "user-structures",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored value and the moment it was written.
///
/// Entries are never mutated in place; an update writes a new entry with a
/// new `stored_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub key: String,
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

/// Entry shape as held by backends
pub type StoredEntry = CacheEntry<serde_json::Value>;

impl<T> CacheEntry<T> {
    /// Create an entry stamped with the current time
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self::with_stored_at(key, value, Utc::now())
    }

    /// Create an entry with an explicit timestamp
    pub fn with_stored_at(key: impl Into<String>, value: T, stored_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            value,
            stored_at,
        }
    }

    /// Whether the entry is older than `ttl` at `now`
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.stored_at > ttl
    }
}

impl<T: Serialize> CacheEntry<T> {
    /// Convert to the backend representation
    pub fn encode(&self) -> ChemResult<StoredEntry> {
        Ok(CacheEntry {
            key: self.key.clone(),
            value: serde_json::to_value(&self.value)?,
            stored_at: self.stored_at,
        })
    }
}

impl StoredEntry {
    /// Convert from the backend representation
    pub fn decode<T: DeserializeOwned>(self) -> ChemResult<CacheEntry<T>> {
        Ok(CacheEntry {
            key: self.key,
            value: serde_json::from_value(self.value)?,
            stored_at: self.stored_at,
        })
    }
}

/// Abstract durable store
///
/// Operations may fail (disk full, corrupt files). Callers on the lookup
/// path log and ignore those failures; see [`crate::cache::LookupCache`].
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Insert or fully replace the entry at `entry.key`
    async fn put(&self, namespace: Namespace, entry: StoredEntry) -> ChemResult<()>;

    /// Fetch an entry
    async fn get(&self, namespace: Namespace, key: &str) -> ChemResult<Option<StoredEntry>>;

    /// Remove an entry, returning whether it existed
    async fn delete(&self, namespace: Namespace, key: &str) -> ChemResult<bool>;

    /// Number of entries in a namespace
    async fn count(&self, namespace: Namespace) -> ChemResult<usize>;

    /// All entries of a namespace, oldest first
    async fn list_by_recency(&self, namespace: Namespace) -> ChemResult<Vec<StoredEntry>>;

    /// Remove every entry of a namespace
    async fn clear(&self, namespace: Namespace) -> ChemResult<()>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Error helper shared by backends
pub(crate) fn store_error(namespace: Namespace, reason: impl fmt::Display) -> ChemError {
    ChemError::store(namespace.as_str(), reason.to_string())
}
