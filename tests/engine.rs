//! End-to-end tests for the full search pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rowsift::{
    CacheStore, OrderKey, Row, SearchConfig, SearchEngine, Table, Value, WeightHook,
};

fn people() -> Table {
    let mut table = Table::new(["name", "city", "notes"]);
    table.push_row(Row::new(vec![
        Value::from("ada"),
        Value::from("london"),
        Value::from("cat dog"),
    ]));
    table.push_row(Row::new(vec![
        Value::from("bob"),
        Value::from("athens"),
        Value::from("concatenate"),
    ]));
    table.push_row(Row::new(vec![
        Value::from("cy"),
        Value::from("berlin"),
        Value::from("dog walker"),
    ]));
    table.push_row(Row::new(vec![
        Value::from("dee"),
        Value::from("athens"),
        Value::from("cat person"),
    ]));
    table.push_row(Row::new(vec![
        Value::from("eve"),
        Value::from("york"),
        Value::from("cat cat cat"),
    ]));
    table
}

fn uncached(query: &str, table: Table) -> SearchConfig {
    let mut config = SearchConfig::new(query, table);
    config.cache_enabled = false;
    config
}

fn engine(config: SearchConfig) -> SearchEngine {
    SearchEngine::with_store(config, Arc::new(CacheStore::new())).unwrap()
}

fn names(table: &Table) -> Vec<String> {
    (0..table.len())
        .map(|row| table.value(row, "name").unwrap().to_text())
        .collect()
}

/// Weight hook that contributes nothing but counts how often scoring ran.
struct Probe {
    calls: AtomicUsize,
}

impl Probe {
    fn new() -> Arc<Self> {
        Arc::new(Probe {
            calls: AtomicUsize::new(0),
        })
    }

    fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WeightHook for Probe {
    fn weight(&self, _table: &Table, _row: &Row, _term: &str) -> i64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        0
    }
}

#[test]
fn and_semantics_require_every_term() {
    // "cat" matches several rows, "zebra" matches none.
    let result = engine(uncached("cat zebra", people())).run();
    assert!(result.is_empty());
    assert_eq!(result.columns(), people().columns());

    // Both terms present in one row only.
    let result = engine(uncached("cat dog", people())).run();
    assert_eq!(names(&result), vec!["ada"]);
}

#[test]
fn full_match_bonus_outranks_substring_matches() {
    let mut config = uncached("cat", people());
    config.add_full_match_bonus = true;
    config.order_by_weight_first = true;
    let result = engine(config).run();

    // eve (3 token hits) beats ada and dee (1 each), all beat bob's
    // substring-only hit in "concatenate".
    assert_eq!(names(&result), vec!["eve", "ada", "dee", "bob"]);
}

#[test]
fn full_match_only_excludes_substring_rows() {
    let mut config = uncached("cat", people());
    config.full_match_only = true;
    config.order_by_weight_first = true;
    let result = engine(config).run();

    assert_eq!(names(&result), vec!["eve", "ada", "dee"]);
}

#[test]
fn take_full_match_only_falls_back_to_partials() {
    let mut config = uncached("cat", people());
    config.take_full_match_only_when_found = true;
    let result = engine(config).run();
    // Full matches exist, so bob's substring match is dropped.
    assert_eq!(result.len(), 3);

    // A query that only ever matches as a substring keeps its partials.
    let mut config = uncached("concat", people());
    config.take_full_match_only_when_found = true;
    let result = engine(config).run();
    assert_eq!(names(&result), vec!["bob"]);
}

#[test]
fn equal_rows_keep_input_order() {
    let mut config = uncached("athens", people());
    config.order_by_weight_first = true;
    let result = engine(config).run();

    // bob and dee tie on weight; input order decides.
    assert_eq!(names(&result), vec!["bob", "dee"]);
}

#[test]
fn weight_first_then_order_keys() {
    let mut config = uncached("cat", people());
    config.add_full_match_bonus = true;
    config.order_by_weight_first = true;
    config
        .order_by
        .insert("city".to_string(), OrderKey::ascending(1));
    let result = engine(config).run();

    // eve wins on weight; ada and dee tie and break on city.
    assert_eq!(names(&result), vec!["eve", "dee", "ada", "bob"]);
}

#[test]
fn order_keys_apply_by_priority() {
    let mut config = uncached("a", people());
    config
        .order_by
        .insert("city".to_string(), OrderKey::ascending(1));
    config
        .order_by
        .insert("name".to_string(), OrderKey::descending(2));
    let result = engine(config).run();

    // Every row contains "a" somewhere. Cities ascending; the athens tie
    // breaks on name descending.
    assert_eq!(names(&result), vec!["dee", "bob", "cy", "ada", "eve"]);
}

#[test]
fn truncation_returns_top_ranked_rows() {
    let mut config = uncached("cat", people());
    config.add_full_match_bonus = true;
    config.order_by_weight_first = true;
    config.max_return = 2;
    let result = engine(config).run();
    assert_eq!(names(&result), vec!["eve", "ada"]);

    let mut config = uncached("cat", people());
    config.max_return = 0;
    assert_eq!(engine(config).run().len(), 4);
}

#[test]
fn blank_query_returns_input_unchanged() {
    let table = people();
    assert_eq!(engine(uncached("", table.clone())).run(), table);
    assert_eq!(engine(uncached("  \t ", table.clone())).run(), table);
}

#[test]
fn ignore_and_only_fields_limit_matching() {
    let mut config = uncached("athens", people());
    config.ignore_fields = vec!["city".to_string()];
    assert!(engine(config).run().is_empty());

    let mut config = uncached("cat", people());
    config.only_fields = vec!["name".to_string()];
    assert!(engine(config).run().is_empty());

    let mut config = uncached("ada", people());
    config.only_fields = vec!["name".to_string()];
    assert_eq!(engine(config).run().len(), 1);
}

#[test]
fn parallel_run_matches_sequential_run() {
    let mut big = Table::new(["word", "tag"]);
    for index in 0..200 {
        let text = format!("row {} {}", index, if index % 2 == 0 { "cat" } else { "dog" });
        big.push_row(Row::new(vec![
            Value::from(text),
            Value::from(format!("t{}", index % 7)),
        ]));
    }

    let mut sequential = uncached("cat", big.clone());
    sequential.order_by_weight_first = true;
    sequential
        .order_by
        .insert("tag".to_string(), OrderKey::ascending(1));

    let mut parallel = sequential.clone();
    parallel.parallelism = 4;

    assert_eq!(engine(sequential).run(), engine(parallel).run());
}

#[test]
fn cache_hit_skips_scoring() {
    let store = Arc::new(CacheStore::new());
    let probe = Probe::new();

    let mut config = SearchConfig::new("cat", people());
    config.weight_hooks.push(probe.clone());
    let engine = SearchEngine::with_store(config, store).unwrap();

    let first = engine.run();
    let after_first = probe.count();
    assert!(after_first > 0);

    let second = engine.run();
    assert_eq!(first, second);
    // Second run came from the cache: no further hook calls.
    assert_eq!(probe.count(), after_first);
}

#[test]
fn dataset_change_invalidates_cache() {
    let store = Arc::new(CacheStore::new());
    let probe = Probe::new();

    let mut config = SearchConfig::new("cat", people());
    config.weight_hooks.push(probe.clone());
    let first = SearchEngine::with_store(config, store.clone()).unwrap().run();
    let after_first = probe.count();
    assert_eq!(first.len(), 4);

    // Mutate one cell: bob's notes no longer contain "cat".
    let mut changed = people();
    assert!(changed.set_value(1, "notes", Value::from("bookkeeper")));

    let mut config = SearchConfig::new("cat", changed);
    config.weight_hooks.push(probe.clone());
    let second = SearchEngine::with_store(config, store).unwrap().run();

    assert!(probe.count() > after_first);
    assert_eq!(second.len(), 3);
}

#[test]
fn manual_clear_mode_serves_stale_results_until_cleared() {
    let store = Arc::new(CacheStore::new());

    let mut config = SearchConfig::new("cat", people());
    config.cache_manual_clear = true;
    let stale = SearchEngine::with_store(config, store.clone()).unwrap().run();
    assert_eq!(stale.len(), 4);

    // New dataset without any "cat" rows, same engine name.
    let mut empty_of_cats = Table::new(["name", "city", "notes"]);
    empty_of_cats.push_row(Row::new(vec![
        Value::from("zed"),
        Value::from("oslo"),
        Value::from("fish"),
    ]));
    let mut config = SearchConfig::new("cat", empty_of_cats);
    config.cache_manual_clear = true;
    let engine = SearchEngine::with_store(config, store).unwrap();

    // Staleness is the caller's problem until an explicit clear.
    assert_eq!(engine.run(), stale);
    assert!(engine.clear_cache());
    assert!(engine.run().is_empty());
}

#[test]
fn cache_keys_are_case_sensitive_raw_queries() {
    let store = Arc::new(CacheStore::new());
    let probe = Probe::new();

    let mut config = SearchConfig::new("CAT", people());
    config.weight_hooks.push(probe.clone());
    let upper = SearchEngine::with_store(config, store.clone()).unwrap();
    let first = upper.run();
    let after_first = probe.count();

    // Matching is case-insensitive, so the results agree, but the differing
    // raw query misses the cache and rescores.
    let mut config = SearchConfig::new("cat", people());
    config.weight_hooks.push(probe.clone());
    let lower = SearchEngine::with_store(config, store).unwrap();
    assert_eq!(lower.run(), first);
    assert!(probe.count() > after_first);
}

#[test]
fn engines_with_different_names_do_not_interfere() {
    let store = Arc::new(CacheStore::new());

    let mut config = SearchConfig::new("cat", people());
    config.engine_name = "first".to_string();
    config.cache_manual_clear = true;
    let first = SearchEngine::with_store(config, store.clone()).unwrap();

    let mut config = SearchConfig::new("dog", people());
    config.engine_name = "second".to_string();
    config.cache_manual_clear = true;
    let second = SearchEngine::with_store(config, store).unwrap();

    let dogs = second.run();
    assert!(first.clear_cache());
    // Clearing "first" leaves "second"'s cached result intact.
    assert_eq!(second.run(), dogs);
}
