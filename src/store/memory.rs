//! In-memory store backend

use super::table::NamespaceTable;
use super::{Namespace, PersistentStore, StoredEntry};
use crate::error::ChemResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Non-durable store for tests and throwaway sessions.
///
/// Each namespace has its own lock, so writes to different namespaces never
/// contend.
#[derive(Debug)]
pub struct MemoryStore {
    tables: HashMap<Namespace, RwLock<NamespaceTable>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: Namespace::all()
                .iter()
                .map(|ns| (*ns, RwLock::new(NamespaceTable::default())))
                .collect(),
        }
    }

    fn table(&self, namespace: Namespace) -> &RwLock<NamespaceTable> {
        // Every namespace is inserted at construction
        &self.tables[&namespace]
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn put(&self, namespace: Namespace, entry: StoredEntry) -> ChemResult<()> {
        self.table(namespace).write().await.put(entry);
        Ok(())
    }

    async fn get(&self, namespace: Namespace, key: &str) -> ChemResult<Option<StoredEntry>> {
        Ok(self.table(namespace).read().await.get(key))
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> ChemResult<bool> {
        Ok(self.table(namespace).write().await.remove(key))
    }

    async fn count(&self, namespace: Namespace) -> ChemResult<usize> {
        Ok(self.table(namespace).read().await.len())
    }

    async fn list_by_recency(&self, namespace: Namespace) -> ChemResult<Vec<StoredEntry>> {
        Ok(self.table(namespace).read().await.by_recency())
    }

    async fn clear(&self, namespace: Namespace) -> ChemResult<()> {
        self.table(namespace).write().await.clear();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CacheEntry;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let store = MemoryStore::new();
        let entry = CacheEntry::new("2244", json!({"MolecularFormula": "C9H8O4"}));

        store.put(Namespace::CompoundById, entry.clone()).await.unwrap();
        let found = store.get(Namespace::CompoundById, "2244").await.unwrap();

        assert_eq!(found, Some(entry));
    }

    #[tokio::test]
    async fn namespaces_do_not_collide() {
        let store = MemoryStore::new();
        store
            .put(Namespace::CompoundById, CacheEntry::new("k", json!("compound")))
            .await
            .unwrap();
        store
            .put(Namespace::Settings, CacheEntry::new("k", json!("setting")))
            .await
            .unwrap();

        let compound = store.get(Namespace::CompoundById, "k").await.unwrap().unwrap();
        let setting = store.get(Namespace::Settings, "k").await.unwrap().unwrap();
        assert_eq!(compound.value, json!("compound"));
        assert_eq!(setting.value, json!("setting"));
        assert!(store.get(Namespace::NameToId, "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_and_count() {
        let store = MemoryStore::new();
        for key in ["a", "b", "c"] {
            store
                .put(Namespace::NameToId, CacheEntry::new(key, json!(1)))
                .await
                .unwrap();
        }
        assert_eq!(store.count(Namespace::NameToId).await.unwrap(), 3);

        assert!(store.delete(Namespace::NameToId, "b").await.unwrap());
        assert!(!store.delete(Namespace::NameToId, "b").await.unwrap());
        assert_eq!(store.count(Namespace::NameToId).await.unwrap(), 2);

        store.clear(Namespace::NameToId).await.unwrap();
        assert_eq!(store.count(Namespace::NameToId).await.unwrap(), 0);
    }
}
