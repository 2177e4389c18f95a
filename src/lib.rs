//! In-memory weighted keyword search over tabular data.
//!
//! Callers supply a [`Table`], a query, and a [`SearchConfig`]; the engine
//! returns a ranked, optionally truncated subset of rows. There is no
//! persistent index: every run scans the dataset, scoring each row with
//! AND semantics across whitespace-split query terms, per-column weighting,
//! and optional whole-token bonuses, then orders and truncates the matches.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐    ┌────────────┐    ┌─────────────┐    ┌───────────┐
//! │ table.rs  │───▶│ scoring.rs │───▶│ assemble.rs │───▶│ engine.rs │
//! │ (dataset) │    │ (weights,  │    │ (order,     │    │ (run      │
//! │           │    │  AND match)│    │  truncate)  │    │  pipeline)│
//! └───────────┘    └────────────┘    └─────────────┘    └───────────┘
//!                                                             │
//!                                                       ┌───────────┐
//!                                                       │ cache.rs  │
//!                                                       │ (per-name │
//!                                                       │  results) │
//!                                                       └───────────┘
//! ```
//!
//! Scoring is the only parallel stage: rows are independent, so a bounded
//! rayon pool scans them concurrently and the assembler re-establishes a
//! deterministic order afterwards. Results are cached per engine name
//! against a snapshot of the dataset, and the cache self-invalidates when
//! the dataset changes (unless manual-clear mode hands that responsibility
//! to the caller).
//!
//! # Usage
//!
//! ```
//! use rowsift::{Row, SearchConfig, SearchEngine, Table, Value};
//!
//! let mut table = Table::new(["name", "notes"]);
//! table.push_row(Row::new(vec![Value::from("cat"), Value::from("likes naps")]));
//! table.push_row(Row::new(vec![Value::from("dog"), Value::from("likes walks")]));
//!
//! let mut config = SearchConfig::new("cat", table);
//! config.order_by_weight_first = true;
//! config.cache_enabled = false;
//!
//! let engine = SearchEngine::new(config).expect("valid configuration");
//! let ranked = engine.run();
//! assert_eq!(ranked.len(), 1);
//! assert_eq!(ranked.value(0, "name"), Some(&Value::from("cat")));
//! ```

mod assemble;
mod cache;
mod config;
mod engine;
mod scoring;
mod table;

pub use cache::CacheStore;
pub use config::{
    ConfigError, OrderKey, RowVerifier, SearchConfig, SortDirection, WeightHook,
    DEFAULT_ENGINE_NAME, DEFAULT_FULL_MATCH_BONUS, DEFAULT_WEIGHT,
};
pub use engine::SearchEngine;
pub use scoring::{tokenize, RowScore};
pub use table::{Row, Table, Value};
