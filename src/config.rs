//! Search configuration: the parameter bag bound to one engine instance,
//! the multi-key ordering keys, and the hook traits for caller-supplied
//! scoring logic.
//!
//! Hooks are named strategy objects behind `Arc`, not raw closures, so a
//! configuration clones without special-casing anything. A panicking hook is
//! a caller bug and propagates uncaught.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::table::{Row, Table};

/// Weight used for a matching column with no explicit weighting entry,
/// when default weighting is allowed.
pub const DEFAULT_WEIGHT: i64 = 1;

/// Default extra weight folded into the occurrence count when a term matches
/// a column value as a whole token.
pub const DEFAULT_FULL_MATCH_BONUS: i64 = 100;

/// Engine name used for cache keying when the caller does not pick one.
pub const DEFAULT_ENGINE_NAME: &str = "rowsift";

/// Sort direction for one order-by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One order-by key. Keys apply in ascending priority order, so the lowest
/// priority value sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKey {
    pub direction: SortDirection,
    pub priority: i32,
}

impl OrderKey {
    pub fn ascending(priority: i32) -> Self {
        OrderKey {
            direction: SortDirection::Ascending,
            priority,
        }
    }

    pub fn descending(priority: i32) -> Self {
        OrderKey {
            direction: SortDirection::Descending,
            priority,
        }
    }
}

/// Row-level verification predicate, run before any term scoring.
///
/// Returning `false` excludes the row from the result set with no further
/// work.
pub trait RowVerifier: Send + Sync {
    fn accept(&self, table: &Table, row: &Row) -> bool;
}

/// Per-term weight contribution, run once per row and query term before the
/// column scan.
///
/// Contributions may be negative; the scoring engine's strict-increase rule
/// decides whether the row survives the term.
pub trait WeightHook: Send + Sync {
    fn weight(&self, table: &Table, row: &Row, term: &str) -> i64;
}

/// Configuration for one engine instance, read-only for the duration of a
/// run.
#[derive(Clone)]
pub struct SearchConfig {
    /// Raw query string. Blank or whitespace-only queries short-circuit the
    /// run and return the dataset unchanged.
    pub query: String,
    /// The table to search. The engine never mutates it.
    pub dataset: Table,
    /// Cache identifier. Engines sharing a store and a name share cached
    /// state.
    pub engine_name: String,
    /// Explicit column weights, keyed by column name (case-insensitive).
    pub weightings: HashMap<String, i64>,
    /// Multi-key ordering applied after the weight ordering.
    pub order_by: HashMap<String, OrderKey>,
    /// Whether descending weight is the primary sort key.
    pub order_by_weight_first: bool,
    /// Columns that never contribute to the score (case-insensitive).
    pub ignore_fields: Vec<String>,
    /// When non-empty, the only columns allowed to contribute
    /// (case-insensitive).
    pub only_fields: Vec<String>,
    /// Degree of parallelism for the scoring pass. 1 runs sequentially;
    /// 0 is rejected at construction.
    pub parallelism: usize,
    /// Result cap. 0 returns every matching row.
    pub max_return: usize,
    /// Whether whole-token matches earn `full_match_bonus`.
    pub add_full_match_bonus: bool,
    /// Bonus added to the occurrence count on a whole-token match.
    pub full_match_bonus: i64,
    /// When set, a column contributes only if the term matched it as a
    /// whole token.
    pub full_match_only: bool,
    /// When set, the assembler keeps only full-match rows, falling back to
    /// all matches if none exist.
    pub take_full_match_only_when_found: bool,
    /// Whether unweighted columns fall back to [`DEFAULT_WEIGHT`].
    pub allow_default_weight: bool,
    /// Whether query results are cached per engine name.
    pub cache_enabled: bool,
    /// When set, the cache is never auto-invalidated; the caller clears it
    /// explicitly.
    pub cache_manual_clear: bool,
    /// Row verification predicates, all of which must accept a row.
    pub verifiers: Vec<Arc<dyn RowVerifier>>,
    /// Per-term weight contributions.
    pub weight_hooks: Vec<Arc<dyn WeightHook>>,
}

impl SearchConfig {
    /// A configuration with the original engine's defaults: caching on,
    /// default weighting on, sequential scoring, unbounded results.
    pub fn new(query: impl Into<String>, dataset: Table) -> Self {
        SearchConfig {
            query: query.into(),
            dataset,
            engine_name: DEFAULT_ENGINE_NAME.to_string(),
            weightings: HashMap::new(),
            order_by: HashMap::new(),
            order_by_weight_first: false,
            ignore_fields: Vec::new(),
            only_fields: Vec::new(),
            parallelism: 1,
            max_return: 0,
            add_full_match_bonus: false,
            full_match_bonus: DEFAULT_FULL_MATCH_BONUS,
            full_match_only: false,
            take_full_match_only_when_found: false,
            allow_default_weight: true,
            cache_enabled: true,
            cache_manual_clear: false,
            verifiers: Vec::new(),
            weight_hooks: Vec::new(),
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("query", &self.query)
            .field("engine_name", &self.engine_name)
            .field("rows", &self.dataset.len())
            .field("weightings", &self.weightings)
            .field("order_by", &self.order_by)
            .field("order_by_weight_first", &self.order_by_weight_first)
            .field("ignore_fields", &self.ignore_fields)
            .field("only_fields", &self.only_fields)
            .field("parallelism", &self.parallelism)
            .field("max_return", &self.max_return)
            .field("add_full_match_bonus", &self.add_full_match_bonus)
            .field("full_match_bonus", &self.full_match_bonus)
            .field("full_match_only", &self.full_match_only)
            .field(
                "take_full_match_only_when_found",
                &self.take_full_match_only_when_found,
            )
            .field("allow_default_weight", &self.allow_default_weight)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_manual_clear", &self.cache_manual_clear)
            .field("verifiers", &self.verifiers.len())
            .field("weight_hooks", &self.weight_hooks.len())
            .finish()
    }
}

/// Error type for configuration problems caught at engine construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Parallelism degree must be at least 1.
    InvalidParallelism { degree: usize },
    /// The bounded worker pool could not be built.
    ThreadPool { reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParallelism { degree } => {
                write!(f, "parallelism degree {} is invalid, need at least 1", degree)
            }
            ConfigError::ThreadPool { reason } => {
                write!(f, "failed to build worker pool: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
