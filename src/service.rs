//! Application-facing facade
//!
//! [`CompoundService`] wires a store, a remote source and the configured
//! policies into a [`LookupCache`] and a [`BatchOrchestrator`], and owns the
//! two namespaces the cache does not: persisted settings and user-authored
//! structures.

use crate::batch::{BatchOptions, BatchOrchestrator, BatchProgress, BatchResult, CancellationToken};
use crate::cache::{CachePolicy, CacheStats, LookupCache};
use crate::compound::{CompoundId, CompoundRecord, Identifier};
use crate::config::{Config, ConfigManager};
use crate::error::{ChemError, ChemResult};
use crate::limiter::RateLimiter;
use crate::remote::RemoteLookup;
use crate::store::{CacheEntry, FileStore, Namespace, PersistentStore};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings key holding the persisted offline flag
const OFFLINE_MODE_KEY: &str = "offline_mode";

/// A saved user structure
pub type SavedStructure = CacheEntry<Value>;

/// Cached compound lookups, batches, settings and saved structures
pub struct CompoundService {
    cache: Arc<LookupCache>,
    batch: BatchOrchestrator,
}

impl CompoundService {
    /// Open a service backed by the file store under `state_dir`
    pub async fn open(
        config: &Config,
        state_dir: &Path,
        remote: Arc<dyn RemoteLookup>,
    ) -> ChemResult<Self> {
        let store = FileStore::open(ConfigManager::store_dir(state_dir)).await?;
        Self::with_store(config, Arc::new(store), remote).await
    }

    /// Build a service over an existing store.
    ///
    /// Restores the offline flag saved by [`set_offline_mode`](Self::set_offline_mode).
    pub async fn with_store(
        config: &Config,
        store: Arc<dyn PersistentStore>,
        remote: Arc<dyn RemoteLookup>,
    ) -> ChemResult<Self> {
        debug!(
            "Opening compound service: store={}, remote={}",
            store.backend_name(),
            remote.source_name()
        );

        let cache = Arc::new(LookupCache::new(
            store,
            remote,
            RateLimiter::new(config.remote.max_per_second),
            CachePolicy::from_config(&config.cache),
        ));
        cache.set_offline_mode(read_offline_flag(cache.store().as_ref()).await);

        let batch = BatchOrchestrator::new(
            Arc::clone(&cache),
            BatchOptions::from_config(&config.batch),
        );

        Ok(Self { cache, batch })
    }

    /// Replace the batch pacing options
    pub fn with_batch_options(mut self, options: BatchOptions) -> Self {
        self.batch = BatchOrchestrator::new(Arc::clone(&self.cache), options);
        self
    }

    pub async fn cached_lookup_by_name(&self, name: &str) -> ChemResult<Option<CompoundRecord>> {
        self.cache.lookup_by_name(name).await
    }

    pub async fn cached_lookup_by_id(&self, id: CompoundId) -> ChemResult<Option<CompoundRecord>> {
        self.cache.lookup_by_id(id).await
    }

    /// Look up a raw identifier: digits are ids, anything else a name
    pub async fn lookup(&self, raw: &str) -> ChemResult<Option<CompoundRecord>> {
        match Identifier::parse(raw)? {
            Identifier::Id(id) => self.cached_lookup_by_id(id).await,
            Identifier::Name(name) => self.cached_lookup_by_name(&name).await,
        }
    }

    /// Run a batch, chunked when the configured chunk size is non-zero
    pub async fn run_batch<S, F>(
        &self,
        identifiers: &[S],
        token: &CancellationToken,
        on_progress: F,
    ) -> BatchResult
    where
        S: AsRef<str>,
        F: FnMut(&BatchProgress),
    {
        self.batch.run_configured(identifiers, token, on_progress).await
    }

    /// Toggle offline mode and persist the choice
    pub async fn set_offline_mode(&self, enabled: bool) -> ChemResult<()> {
        self.cache.set_offline_mode(enabled);
        let entry = CacheEntry::new(OFFLINE_MODE_KEY, Value::Bool(enabled));
        self.cache.store().put(Namespace::Settings, entry).await
    }

    pub fn is_offline_mode(&self) -> bool {
        self.cache.is_offline_mode()
    }

    pub async fn cache_stats(&self) -> ChemResult<CacheStats> {
        self.cache.stats().await
    }

    /// Remove cached lookup results
    pub async fn clear_cache(&self) -> ChemResult<()> {
        self.cache.clear().await
    }

    /// Delete expired lookup results
    pub async fn prune_cache(&self) -> ChemResult<usize> {
        self.cache.prune_expired().await
    }

    /// Save a user-authored structure under `name`, replacing any previous one.
    ///
    /// Saved structures never expire and are not touched by
    /// [`clear_cache`](Self::clear_cache).
    pub async fn save_structure(&self, name: &str, data: Value) -> ChemResult<()> {
        let key = structure_key(name)?;
        self.store()
            .put(Namespace::UserStructures, CacheEntry::new(key.clone(), data))
            .await?;
        info!("Saved structure {}", key);
        Ok(())
    }

    pub async fn load_structure(&self, name: &str) -> ChemResult<SavedStructure> {
        let key = structure_key(name)?;
        let entry = self.store().get(Namespace::UserStructures, &key).await?;
        entry.ok_or(ChemError::StructureNotFound(key))
    }

    /// Saved structures, most recently saved first
    pub async fn list_structures(&self) -> ChemResult<Vec<SavedStructure>> {
        let mut entries = self.store().list_by_recency(Namespace::UserStructures).await?;
        entries.reverse();
        Ok(entries)
    }

    pub async fn delete_structure(&self, name: &str) -> ChemResult<()> {
        let key = structure_key(name)?;
        let existed = self.store().delete(Namespace::UserStructures, &key).await?;
        if !existed {
            return Err(ChemError::StructureNotFound(key));
        }
        info!("Deleted structure {}", key);
        Ok(())
    }

    pub fn cache(&self) -> &Arc<LookupCache> {
        &self.cache
    }

    pub fn batch_options(&self) -> &BatchOptions {
        self.batch.options()
    }

    fn store(&self) -> &Arc<dyn PersistentStore> {
        self.cache.store()
    }
}

fn structure_key(name: &str) -> ChemResult<String> {
    let key = name.trim();
    if key.is_empty() {
        return Err(ChemError::InvalidIdentifier(name.to_string()));
    }
    Ok(key.to_string())
}

async fn read_offline_flag(store: &dyn PersistentStore) -> bool {
    match store.get(Namespace::Settings, OFFLINE_MODE_KEY).await {
        Ok(Some(entry)) => entry.value.as_bool().unwrap_or(false),
        Ok(None) => false,
        Err(e) => {
            warn!("Could not read offline setting, assuming online: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::FixtureRemote;
    use crate::store::MemoryStore;
    use serde_json::json;
    use tempfile::TempDir;

    fn remote() -> Arc<FixtureRemote> {
        Arc::new(
            FixtureRemote::new()
                .with_compound("aspirin", 2244, json!({"MolecularFormula": "C9H8O4"}))
                .with_compound("caffeine", 2519, json!({"MolecularFormula": "C8H10N4O2"})),
        )
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.batch.inter_item_delay_ms = 0;
        config.remote.max_per_second = 50;
        config
    }

    async fn memory_service(remote: Arc<FixtureRemote>) -> CompoundService {
        CompoundService::with_store(&config(), Arc::new(MemoryStore::new()), remote)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn lookup_dispatches_on_identifier_kind() {
        let service = memory_service(remote()).await;

        let by_name = service.lookup("Aspirin").await.unwrap().unwrap();
        let by_id = service.lookup("2244").await.unwrap().unwrap();
        assert_eq!(by_name, by_id);
        assert!(service.lookup("unobtainium").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn offline_mode_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let remote = remote();

        let service = CompoundService::open(&config(), temp.path(), remote.clone())
            .await
            .unwrap();
        service.cached_lookup_by_name("aspirin").await.unwrap();
        service.set_offline_mode(true).await.unwrap();
        drop(service);

        let reopened = CompoundService::open(&config(), temp.path(), remote.clone())
            .await
            .unwrap();
        assert!(reopened.is_offline_mode());
        assert!(reopened.cached_lookup_by_name("ASPIRIN").await.unwrap().is_some());
        assert!(matches!(
            reopened.cached_lookup_by_name("caffeine").await,
            Err(ChemError::Offline(_))
        ));
        assert_eq!(remote.total_calls(), 2);
    }

    #[tokio::test]
    async fn stats_count_every_namespace() {
        let service = memory_service(remote()).await;
        service.cached_lookup_by_name("aspirin").await.unwrap();
        service.cached_lookup_by_id(CompoundId(2519)).await.unwrap();
        service.set_offline_mode(false).await.unwrap();

        let stats = service.cache_stats().await.unwrap();
        assert_eq!(stats.count(Namespace::CompoundById), 2);
        assert_eq!(stats.count(Namespace::NameToId), 1);
        assert_eq!(stats.count(Namespace::Settings), 1);
        assert_eq!(stats.total(), 4);
    }

    #[tokio::test]
    async fn structures_are_independent_of_cache() {
        let service = memory_service(remote()).await;
        service.cached_lookup_by_name("aspirin").await.unwrap();
        service
            .save_structure("my-ring", json!({"smiles": "C1CCCCC1"}))
            .await
            .unwrap();
        service
            .save_structure(" draft ", json!({"smiles": "CCO"}))
            .await
            .unwrap();

        service.clear_cache().await.unwrap();

        let stats = service.cache_stats().await.unwrap();
        assert_eq!(stats.count(Namespace::CompoundById), 0);
        assert_eq!(stats.count(Namespace::UserStructures), 2);

        let loaded = service.load_structure("my-ring").await.unwrap();
        assert_eq!(loaded.value["smiles"], "C1CCCCC1");

        let names: Vec<String> = service
            .list_structures()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(names, vec!["draft", "my-ring"]);
    }

    #[tokio::test]
    async fn missing_structure_is_reported() {
        let service = memory_service(remote()).await;
        assert!(matches!(
            service.load_structure("nope").await,
            Err(ChemError::StructureNotFound(_))
        ));
        assert!(matches!(
            service.delete_structure("nope").await,
            Err(ChemError::StructureNotFound(_))
        ));
        assert!(service.save_structure("  ", json!({})).await.is_err());
    }

    #[tokio::test]
    async fn run_batch_uses_configured_chunking() {
        let mut config = config();
        config.batch.chunk_size = 1;
        let service = CompoundService::with_store(&config, Arc::new(MemoryStore::new()), remote())
            .await
            .unwrap();
        assert_eq!(service.batch_options().chunk_size, 1);

        let mut totals = Vec::new();
        let result = service
            .run_batch(&["aspirin", "caffeine"], &CancellationToken::new(), |p| {
                totals.push((p.current, p.total))
            })
            .await;

        assert_eq!(result.success.len(), 2);
        assert_eq!(totals, vec![(1, 2), (2, 2)]);
    }
}
