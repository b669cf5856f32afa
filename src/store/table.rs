//! In-memory namespace table shared by the store backends

use super::StoredEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entries of one namespace plus a write counter for tie-breaking
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct NamespaceTable {
    next_seq: u64,
    slots: HashMap<String, Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    seq: u64,
    entry: StoredEntry,
}

impl NamespaceTable {
    pub(crate) fn put(&mut self, entry: StoredEntry) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(entry.key.clone(), Slot { seq, entry });
    }

    pub(crate) fn get(&self, key: &str) -> Option<StoredEntry> {
        self.slots.get(key).map(|slot| slot.entry.clone())
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    /// Oldest first by `stored_at`, then by write order
    pub(crate) fn by_recency(&self) -> Vec<StoredEntry> {
        let mut slots: Vec<&Slot> = self.slots.values().collect();
        slots.sort_by(|a, b| {
            a.entry
                .stored_at
                .cmp(&b.entry.stored_at)
                .then_with(|| a.seq.cmp(&b.seq))
        });
        slots.into_iter().map(|slot| slot.entry.clone()).collect()
    }
}
