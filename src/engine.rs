//! The engine surface: construction-time validation and cache sync, plus
//! the run pipeline tying scoring, assembly, and caching together.

use std::fmt;
use std::sync::Arc;

use crate::assemble::assemble;
use crate::cache::CacheStore;
use crate::config::{ConfigError, SearchConfig};
use crate::scoring::score_rows;
use crate::table::Table;

/// A search engine bound to one configuration.
///
/// Construction validates the configuration, builds the bounded worker pool,
/// and runs the cache coherency check. [`SearchEngine::run`] is the single
/// search operation.
pub struct SearchEngine {
    config: SearchConfig,
    store: Arc<CacheStore>,
    pool: Option<rayon::ThreadPool>,
}

impl SearchEngine {
    /// Build an engine against the process-wide cache store.
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        Self::with_store(config, CacheStore::global())
    }

    /// Build an engine against an injected cache store.
    ///
    /// Engines sharing a store coexist by name; separate stores are fully
    /// isolated.
    pub fn with_store(config: SearchConfig, store: Arc<CacheStore>) -> Result<Self, ConfigError> {
        if config.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism { degree: 0 });
        }

        // Degree 1 is fully sequential; no pool to build.
        let pool = if config.parallelism > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.parallelism)
                .build()
                .map_err(|error| ConfigError::ThreadPool {
                    reason: error.to_string(),
                })?;
            Some(pool)
        } else {
            None
        };

        if config.cache_enabled {
            store.sync(
                &config.engine_name,
                &config.dataset,
                config.cache_manual_clear,
            );
        }

        Ok(SearchEngine {
            config,
            store,
            pool,
        })
    }

    /// Run the search and return the ranked table.
    ///
    /// An empty dataset or a blank query returns a copy of the input
    /// unchanged; this is graceful degradation, not an error. A cache hit
    /// skips scoring and assembly entirely.
    pub fn run(&self) -> Table {
        let config = &self.config;

        if config.dataset.is_empty() || config.query.trim().is_empty() {
            return config.dataset.clone();
        }

        if config.cache_enabled {
            if let Some(hit) = self.store.get(&config.engine_name, &config.query) {
                return hit;
            }
        }

        let scored = score_rows(&config.dataset, config, self.pool.as_ref());
        let ranked = assemble(&config.dataset, scored, config);

        if config.cache_enabled {
            self.store
                .put(&config.engine_name, &config.query, ranked.clone());
        }

        ranked
    }

    /// Clear this engine's cached state.
    ///
    /// Only effective when caching and manual-clear mode are both enabled;
    /// otherwise a no-op returning `false`.
    pub fn clear_cache(&self) -> bool {
        if self.config.cache_enabled && self.config.cache_manual_clear {
            self.store.clear(&self.config.engine_name);
            true
        } else {
            false
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}
