//! Read-through cache for compound lookups
//!
//! Every request follows the same path:
//!
//! | Step | Outcome |
//! |------|---------|
//! | Cache check | fresh entry → return it |
//! | Offline | miss → `ChemError::Offline` |
//! | Remote fetch (rate limited) | not found → `Ok(None)`, failure → `Err` |
//! | Store | write, then evict oldest compounds over capacity |
//!
//! Expiry is lazy: an entry older than the TTL is deleted by the read that
//! finds it. [`LookupCache::prune_expired`] sweeps explicitly.
//!
//! Store failures never fail a lookup. They are logged and the value is
//! served uncached.

pub mod policy;

pub use policy::{normalize_name, CachePolicy, CacheStats};

use crate::compound::{CompoundId, CompoundRecord};
use crate::error::{ChemError, ChemResult};
use crate::limiter::RateLimiter;
use crate::remote::RemoteLookup;
use crate::store::{CacheEntry, Namespace, PersistentStore};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read-through cache over a store, a rate limiter and a remote source
pub struct LookupCache {
    store: Arc<dyn PersistentStore>,
    remote: Arc<dyn RemoteLookup>,
    limiter: RateLimiter,
    policy: CachePolicy,
    offline: AtomicBool,
}

impl LookupCache {
    pub fn new(
        store: Arc<dyn PersistentStore>,
        remote: Arc<dyn RemoteLookup>,
        limiter: RateLimiter,
        policy: CachePolicy,
    ) -> Self {
        Self {
            store,
            remote,
            limiter,
            policy,
            offline: AtomicBool::new(false),
        }
    }

    /// Look up a compound by name.
    ///
    /// The name is trimmed and lowercased before it is used as a key, so
    /// "Aspirin" and "aspirin" share one entry. A cached name still goes
    /// through [`lookup_by_id`](Self::lookup_by_id) for the record.
    pub async fn lookup_by_name(&self, name: &str) -> ChemResult<Option<CompoundRecord>> {
        let key = normalize_name(name);
        if key.is_empty() {
            return Err(ChemError::InvalidIdentifier(name.to_string()));
        }

        if let Some(id) = self.read_fresh::<CompoundId>(Namespace::NameToId, &key).await {
            debug!("Name cache hit: {} -> {}", key, id);
            return self.record_for_name(name, id).await;
        }

        if self.is_offline_mode() {
            return Err(ChemError::Offline(name.trim().to_string()));
        }

        let remote = Arc::clone(&self.remote);
        let query = key.clone();
        let resolved = self
            .limiter
            .submit(move || async move { remote.resolve_name(&query).await })
            .await?;

        match resolved {
            Some(id) => {
                debug!("Resolved {} -> {}", key, id);
                self.write(Namespace::NameToId, &key, &id).await;
                self.record_for_name(name, id).await
            }
            None => {
                debug!("No compound named {}", key);
                Ok(None)
            }
        }
    }

    /// Look up a compound by canonical id
    pub async fn lookup_by_id(&self, id: CompoundId) -> ChemResult<Option<CompoundRecord>> {
        let key = id.to_string();

        if let Some(record) = self
            .read_fresh::<CompoundRecord>(Namespace::CompoundById, &key)
            .await
        {
            debug!("Compound cache hit: {}", key);
            return Ok(Some(record));
        }

        if self.is_offline_mode() {
            return Err(ChemError::Offline(key));
        }

        let remote = Arc::clone(&self.remote);
        let fetched = self
            .limiter
            .submit(move || async move { remote.fetch_record(id).await })
            .await?;

        match fetched {
            Some(record) => {
                self.write(Namespace::CompoundById, &key, &record).await;
                Ok(Some(record))
            }
            None => {
                debug!("No compound with id {}", key);
                Ok(None)
            }
        }
    }

    /// Record lookup on behalf of a name. An offline miss names what the
    /// caller asked for, not the id it resolved to.
    async fn record_for_name(&self, name: &str, id: CompoundId) -> ChemResult<Option<CompoundRecord>> {
        match self.lookup_by_id(id).await {
            Err(ChemError::Offline(_)) => Err(ChemError::Offline(name.trim().to_string())),
            other => other,
        }
    }

    /// Enable or disable offline mode. While enabled, misses never reach
    /// the remote service.
    pub fn set_offline_mode(&self, enabled: bool) {
        let previous = self.offline.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            info!("Offline mode {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    pub fn is_offline_mode(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Entry counts for every namespace
    pub async fn stats(&self) -> ChemResult<CacheStats> {
        let mut stats = CacheStats::default();
        for namespace in Namespace::all() {
            stats
                .counts
                .insert(*namespace, self.store.count(*namespace).await?);
        }
        Ok(stats)
    }

    /// Remove every cached lookup result. User records and settings stay.
    pub async fn clear(&self) -> ChemResult<()> {
        for namespace in Namespace::lookup_results() {
            self.store.clear(*namespace).await?;
        }
        info!("Cleared cached lookup results");
        Ok(())
    }

    /// Delete every expired lookup result, returning how many were removed
    pub async fn prune_expired(&self) -> ChemResult<usize> {
        let now = Utc::now();
        let mut removed = 0;

        for namespace in Namespace::lookup_results() {
            let entries = self.store.list_by_recency(*namespace).await?;
            for entry in entries
                .iter()
                .take_while(|e| e.is_expired(self.policy.ttl, now))
            {
                if self.store.delete(*namespace, &entry.key).await? {
                    removed += 1;
                }
            }
        }

        debug!("Pruned {} expired entries", removed);
        Ok(removed)
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }

    pub fn remote(&self) -> &Arc<dyn RemoteLookup> {
        &self.remote
    }

    /// Read a live entry. Expired and undecodable entries are deleted and
    /// reported as missing; store failures are reported as missing.
    async fn read_fresh<T: DeserializeOwned>(&self, namespace: Namespace, key: &str) -> Option<T> {
        let entry = match self.store.get(namespace, key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed for {}/{}: {}", namespace, key, e);
                return None;
            }
        };

        if self.policy.expires(namespace) && entry.is_expired(self.policy.ttl, Utc::now()) {
            debug!("Cache entry {}/{} expired", namespace, key);
            self.discard(namespace, key).await;
            return None;
        }

        match entry.decode::<T>() {
            Ok(entry) => Some(entry.value),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}/{}: {}", namespace, key, e);
                self.discard(namespace, key).await;
                None
            }
        }
    }

    async fn discard(&self, namespace: Namespace, key: &str) {
        if let Err(e) = self.store.delete(namespace, key).await {
            warn!("Failed to delete cache entry {}/{}: {}", namespace, key, e);
        }
    }

    /// Store a value, then enforce the namespace's capacity bound.
    /// Failures are logged and swallowed.
    async fn write<T: Serialize>(&self, namespace: Namespace, key: &str, value: &T) {
        let entry = match CacheEntry::new(key, value).encode() {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to encode cache entry {}/{}: {}", namespace, key, e);
                return;
            }
        };

        if let Err(e) = self.store.put(namespace, entry).await {
            warn!("Failed to cache {}/{}: {}", namespace, key, e);
            return;
        }

        if let Err(e) = self.evict_over_capacity(namespace).await {
            warn!("Eviction failed in {}: {}", namespace, e);
        }
    }

    /// Delete oldest entries until the namespace is within its bound
    async fn evict_over_capacity(&self, namespace: Namespace) -> ChemResult<usize> {
        let Some(capacity) = self.policy.capacity(namespace) else {
            return Ok(0);
        };

        let count = self.store.count(namespace).await?;
        if count <= capacity {
            return Ok(0);
        }

        let excess = count - capacity;
        let oldest = self.store.list_by_recency(namespace).await?;
        for entry in oldest.iter().take(excess) {
            self.store.delete(namespace, &entry.key).await?;
        }

        debug!("Evicted {} entries from {}", excess, namespace);
        Ok(excess)
    }
}
