//! File-backed store backend
//!
//! Each namespace is one JSON document under the store directory
//! (`compound-by-id.json`, `name-to-id.json`, ...). Every operation takes an
//! exclusive lock on the directory and reads the document from disk, so any
//! number of handles and processes can share one directory. Mutations rewrite
//! the document through a temporary file and a rename, so a crash leaves
//! either the old or the new document on disk.

use super::table::NamespaceTable;
use super::{store_error, Namespace, PersistentStore, StoredEntry};
use crate::error::{ChemError, ChemResult};
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lock file guarding every document in the directory
const LOCK_FILE: &str = ".lock";

/// Durable store persisting each namespace as a JSON document
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (or create) a store rooted at `dir`
    pub async fn open(dir: impl Into<PathBuf>) -> ChemResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ChemError::io(format!("creating store directory {}", dir.display()), e))?;

        let store = Self { dir };
        for namespace in Namespace::all() {
            let count = store.read(*namespace, |table| table.len()).await?;
            debug!("Found {} entries in {}", count, namespace);
        }

        Ok(store)
    }

    /// Directory holding the namespace documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read<R>(
        &self,
        namespace: Namespace,
        view: impl FnOnce(&NamespaceTable) -> R + Send + 'static,
    ) -> ChemResult<R>
    where
        R: Send + 'static,
    {
        self.with_document(namespace, move |path| {
            let table = load_table(path, namespace)?;
            Ok(view(&table))
        })
        .await
    }

    /// Re-read the document, apply `change` and write it back, all under the
    /// directory lock.
    async fn mutate<R>(
        &self,
        namespace: Namespace,
        change: impl FnOnce(&mut NamespaceTable) -> R + Send + 'static,
    ) -> ChemResult<R>
    where
        R: Send + 'static,
    {
        self.with_document(namespace, move |path| {
            let mut table = load_table(path, namespace)?;
            let result = change(&mut table);
            persist(path, namespace, &table)?;
            Ok(result)
        })
        .await
    }

    async fn with_document<R>(
        &self,
        namespace: Namespace,
        work: impl FnOnce(&Path) -> ChemResult<R> + Send + 'static,
    ) -> ChemResult<R>
    where
        R: Send + 'static,
    {
        let lock_path = self.dir.join(LOCK_FILE);
        let path = namespace_path(&self.dir, namespace);

        // flock blocks the thread
        tokio::task::spawn_blocking(move || {
            let _lock = lock_dir(&lock_path)?;
            work(&path)
        })
        .await
        .map_err(|e| ChemError::Internal(format!("store task failed: {}", e)))?
    }
}

/// Take the directory lock. It is released when the returned file is closed.
fn lock_dir(path: &Path) -> ChemResult<File> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| ChemError::io(format!("opening store lock {}", path.display()), e))?;
    file.lock_exclusive()
        .map_err(|e| ChemError::io(format!("locking {}", path.display()), e))?;
    Ok(file)
}

fn namespace_path(dir: &Path, namespace: Namespace) -> PathBuf {
    dir.join(format!("{}.json", namespace.as_str()))
}

/// Read a namespace document. Unreadable documents are moved aside and the
/// namespace starts empty.
fn load_table(path: &Path, namespace: Namespace) -> ChemResult<NamespaceTable> {
    if !path.exists() {
        return Ok(NamespaceTable::default());
    }

    let content = fs::read(path)
        .map_err(|e| ChemError::io(format!("reading store file {}", path.display()), e))?;

    match serde_json::from_slice::<NamespaceTable>(&content) {
        Ok(table) => Ok(table),
        Err(e) => {
            let aside = path.with_extension("json.corrupt");
            warn!(
                "Store file for {} is unreadable ({}), moving it to {}",
                namespace,
                e,
                aside.display()
            );
            fs::rename(path, &aside)
                .map_err(|e| ChemError::io(format!("moving aside {}", path.display()), e))?;
            Ok(NamespaceTable::default())
        }
    }
}

fn persist(path: &Path, namespace: Namespace, table: &NamespaceTable) -> ChemResult<()> {
    if table.is_empty() {
        if path.exists() {
            fs::remove_file(path)
                .map_err(|e| store_error(namespace, format!("removing {}: {}", path.display(), e)))?;
        }
        return Ok(());
    }

    let content = serde_json::to_vec(table)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .map_err(|e| store_error(namespace, format!("writing {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| store_error(namespace, format!("replacing {}: {}", path.display(), e)))?;

    Ok(())
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn put(&self, namespace: Namespace, entry: StoredEntry) -> ChemResult<()> {
        self.mutate(namespace, move |table| table.put(entry)).await
    }

    async fn get(&self, namespace: Namespace, key: &str) -> ChemResult<Option<StoredEntry>> {
        let key = key.to_string();
        self.read(namespace, move |table| table.get(&key)).await
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> ChemResult<bool> {
        let key = key.to_string();
        let lookup = key.clone();
        if !self.read(namespace, move |table| table.contains(&lookup)).await? {
            return Ok(false);
        }
        self.mutate(namespace, move |table| table.remove(&key)).await
    }

    async fn count(&self, namespace: Namespace) -> ChemResult<usize> {
        self.read(namespace, |table| table.len()).await
    }

    async fn list_by_recency(&self, namespace: Namespace) -> ChemResult<Vec<StoredEntry>> {
        self.read(namespace, |table| table.by_recency()).await
    }

    async fn clear(&self, namespace: Namespace) -> ChemResult<()> {
        self.mutate(namespace, |table| table.clear()).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
