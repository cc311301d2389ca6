//! WorkspaceCache: one immutable snapshot per workspace key.
//!
//! Entries are replaced or dropped wholesale, never patched. Readers clone the
//! `Arc<Snapshot>` out of the slot and never hold the lock while querying.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::info;

use crate::hir::{LinkedProject, ProjectStats};

/// A successfully built workspace state.
#[derive(Debug)]
pub struct Snapshot {
    pub key: String,
    pub root: PathBuf,
    /// Monotonic across the whole cache; a newer put always has a larger value.
    pub generation: u64,
    pub loaded_at: SystemTime,
    pub linked: Arc<LinkedProject>,
}

impl Snapshot {
    pub fn stats(&self) -> ProjectStats {
        self.linked.stats()
    }
}

#[derive(Debug, Default)]
pub struct WorkspaceCache {
    slots: RwLock<FxHashMap<String, Arc<Snapshot>>>,
    generation: AtomicU64,
}

impl WorkspaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new snapshot for `key`, replacing any previous one.
    pub fn put(
        &self,
        key: impl Into<String>,
        root: impl Into<PathBuf>,
        linked: Arc<LinkedProject>,
    ) -> Arc<Snapshot> {
        let key = key.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(Snapshot {
            key: key.clone(),
            root: root.into(),
            generation,
            loaded_at: SystemTime::now(),
            linked,
        });

        self.slots.write().insert(key.clone(), Arc::clone(&snapshot));
        info!(key = %key, generation, "workspace snapshot stored");
        snapshot
    }

    pub fn get(&self, key: &str) -> Option<Arc<Snapshot>> {
        self.slots.read().get(key).cloned()
    }

    /// Drop the snapshot for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.slots.write().remove(key).is_some();
        if removed {
            info!(key = %key, "workspace snapshot invalidated");
        }
        removed
    }

    pub fn has(&self, key: &str) -> bool {
        self.slots.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.slots.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Key of the cached workspace whose root contains `path` (deepest root wins).
    pub fn key_containing(&self, path: &Path) -> Option<String> {
        self.slots
            .read()
            .values()
            .filter(|snapshot| path.starts_with(&snapshot.root))
            .max_by_key(|snapshot| snapshot.root.components().count())
            .map(|snapshot| snapshot.key.clone())
    }
}
