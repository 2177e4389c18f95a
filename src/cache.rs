//! The query/result cache, keyed by engine name.
//!
//! The original design hid this behind process-wide statics. Here it is an
//! explicit service object: engines built with [`crate::SearchEngine::new`]
//! share one lazily created process-wide store, and
//! [`crate::SearchEngine::with_store`] injects a private one. Either way,
//! any number of logical engines coexist by name.
//!
//! Entries live in a `DashMap`, so operations on one engine name never
//! serialize against another name's entry.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::table::Table;

static DEFAULT_STORE: Lazy<Arc<CacheStore>> = Lazy::new(|| Arc::new(CacheStore::new()));

/// Cached state for one engine name: the dataset snapshot the results were
/// computed against, plus the ranked result per raw query string.
#[derive(Debug, Default)]
struct CacheEntry {
    snapshot: Table,
    results: HashMap<String, Table>,
}

/// Concurrent query/result cache shared by any number of named engines.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: DashMap<String, CacheEntry>,
}

impl CacheStore {
    pub fn new() -> Self {
        CacheStore {
            entries: DashMap::new(),
        }
    }

    /// The process-wide default store.
    pub fn global() -> Arc<CacheStore> {
        Arc::clone(&DEFAULT_STORE)
    }

    /// Bring the entry for `name` in line with `dataset`, run once at engine
    /// construction.
    ///
    /// The snapshot is replaced and every cached result dropped when no
    /// usable snapshot exists yet, or when the dataset visibly changed (row
    /// count, or any row by full value equality). Manual-clear mode skips
    /// the change detection only: staleness becomes the caller's problem,
    /// but first use still seeds the snapshot.
    pub(crate) fn sync(&self, name: &str, dataset: &Table, manual_clear: bool) {
        let mut entry = self.entries.entry(name.to_string()).or_default();
        let stale = entry.snapshot.is_empty()
            || (!manual_clear
                && (entry.snapshot.len() != dataset.len()
                    || entry.snapshot.rows() != dataset.rows()));
        if stale {
            entry.snapshot = dataset.clone();
            entry.results.clear();
        }
    }

    /// Cached ranked result for the raw query string, if any.
    ///
    /// The key is the unmodified query: case and whitespace differences are
    /// distinct cache entries even though matching itself is
    /// case-insensitive.
    pub(crate) fn get(&self, name: &str, query: &str) -> Option<Table> {
        self.entries
            .get(name)
            .and_then(|entry| entry.results.get(query).cloned())
    }

    /// Store a ranked result, but only while the entry still exists.
    ///
    /// A manual clear may race between engine construction and the run; a
    /// result computed against a cleared entry is dropped rather than
    /// resurrecting the entry.
    pub(crate) fn put(&self, name: &str, query: &str, result: Table) {
        if let Some(mut entry) = self.entries.get_mut(name) {
            entry.results.insert(query.to_string(), result);
        }
    }

    /// Drop the snapshot and every cached result for `name`.
    pub(crate) fn clear(&self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }
}
