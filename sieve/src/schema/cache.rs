//! Per-index schema cache
//!
//! Entries are immutable `Arc<SchemaMap>` snapshots. Writers swap whole
//! entries, so a reader holding a snapshot never sees a half-updated schema.

use super::map::SchemaMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SchemaCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl SchemaCacheStats {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }
}

/// Cache of schemas keyed by index name. Cheap to clone; clones share entries.
#[derive(Clone, Debug, Default)]
pub struct SchemaCache {
    entries: Arc<RwLock<HashMap<String, Arc<SchemaMap>>>>,
    stats: Arc<SchemaCacheStats>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: &str) -> Option<Arc<SchemaMap>> {
        let entries = self.entries.read();
        match entries.get(index) {
            Some(schema) => {
                self.stats.hit();
                tracing::debug!(index, "schema cache hit");
                Some(Arc::clone(schema))
            }
            None => {
                self.stats.miss();
                tracing::debug!(index, "schema cache miss");
                None
            }
        }
    }

    /// Store a schema snapshot, replacing any previous one for `index`
    pub fn insert(&self, index: impl Into<String>, schema: SchemaMap) -> Arc<SchemaMap> {
        let schema = Arc::new(schema);
        self.entries
            .write()
            .insert(index.into(), Arc::clone(&schema));
        schema
    }

    /// Drop the cached schema of `index`. Returns whether an entry was present.
    pub fn invalidate(&self, index: &str) -> bool {
        let removed = self.entries.write().remove(index).is_some();
        if removed {
            self.stats.invalidate();
            tracing::debug!(index, "schema cache invalidated");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> Arc<SchemaCacheStats> {
        Arc::clone(&self.stats)
    }
}
