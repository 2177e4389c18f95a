//! The scoring pass: multi-term AND matching with per-column weighting.
//!
//! Every row is scored independently, so the pass parallelizes across rows
//! with a bounded rayon pool. Only two pieces of state are shared between
//! workers, and each sits behind its own lock: the score map (row index to
//! weight and full-match flag) and the matched-row accumulator. Everything
//! else is read-only.
//!
//! Terms are literal strings. Occurrence counting is plain substring
//! counting; there is no regex engine anywhere in the match path, so a term
//! like `c++` needs no escaping and cannot backtrack.

use std::collections::HashMap;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::config::{SearchConfig, DEFAULT_WEIGHT};
use crate::table::{Row, Table};

/// Transient per-run score for one matched row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowScore {
    /// Final cumulative weight after every term was satisfied.
    pub weight: i64,
    /// Whether any term matched any column as a whole token.
    pub full_match: bool,
}

/// Output of one scoring pass.
///
/// `matched` is in worker completion order, which is nondeterministic under
/// parallel scoring. The assembler restores input order before sorting.
#[derive(Debug, Default)]
pub struct ScoredRows {
    pub scores: HashMap<usize, RowScore>,
    pub matched: Vec<usize>,
}

/// Split a query into lowercase terms on single spaces.
///
/// Repeated spaces produce empty tokens; they can never match anything and
/// must not reject rows, so they are dropped here.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(' ')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// A column that survived the only/ignore filters, with its resolved weight.
struct ColumnPlan {
    index: usize,
    weight: i64,
}

/// Resolve the eligible columns and their weights once per run.
///
/// Column names, filter lists, and weighting keys all compare
/// case-insensitively. Weight resolution: explicit weighting entry, else the
/// default weight when allowed, else zero.
fn plan_columns(table: &Table, config: &SearchConfig) -> Vec<ColumnPlan> {
    let only: Vec<String> = config
        .only_fields
        .iter()
        .map(|name| name.to_lowercase())
        .collect();
    let ignore: Vec<String> = config
        .ignore_fields
        .iter()
        .map(|name| name.to_lowercase())
        .collect();
    let weightings: HashMap<String, i64> = config
        .weightings
        .iter()
        .map(|(name, weight)| (name.to_lowercase(), *weight))
        .collect();
    let fallback = if config.allow_default_weight {
        DEFAULT_WEIGHT
    } else {
        0
    };

    table
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(index, name)| {
            let name = name.to_lowercase();
            if !only.is_empty() && !only.contains(&name) {
                return None;
            }
            if ignore.contains(&name) {
                return None;
            }
            let weight = weightings.get(&name).copied().unwrap_or(fallback);
            Some(ColumnPlan { index, weight })
        })
        .collect()
}

/// Count non-overlapping literal occurrences of `term` in `haystack`.
fn occurrences(haystack: &str, term: &str) -> usize {
    haystack.matches(term).count()
}

/// Whole-token containment: the whitespace-split text contains `term`
/// exactly.
fn contains_whole_token(text: &str, term: &str) -> bool {
    text.split_whitespace().any(|token| token == term)
}

/// Score a single row against every term, or reject it.
///
/// AND semantics: each term must strictly raise the cumulative total, and
/// the total must stay positive. The first failing term rejects the row
/// outright. The strict-increase rule is deliberate: a term whose column
/// matches are cancelled out by a negative hook contribution still rejects
/// the row.
fn score_row(
    table: &Table,
    row: &Row,
    terms: &[String],
    plan: &[ColumnPlan],
    config: &SearchConfig,
) -> Option<RowScore> {
    for verifier in &config.verifiers {
        if !verifier.accept(table, row) {
            return None;
        }
    }

    // Whole-token detection is needed by every full-match feature, not just
    // the bonus.
    let detect_full = config.add_full_match_bonus
        || config.full_match_only
        || config.take_full_match_only_when_found;

    let mut total: i64 = 0;
    let mut full_match = false;

    for term in terms {
        let mut term_weight: i64 = 0;
        for hook in &config.weight_hooks {
            term_weight += hook.weight(table, row, term);
        }

        for column in plan {
            let Some(value) = row.get(column.index) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let text = value.to_text().to_lowercase();
            let mut count = occurrences(&text, term) as i64;
            if count == 0 {
                continue;
            }

            let mut full_here = false;
            if detect_full && contains_whole_token(&text, term) {
                full_here = true;
                full_match = true;
                if config.add_full_match_bonus {
                    count += config.full_match_bonus;
                }
            }

            if config.full_match_only && !full_here {
                continue;
            }
            term_weight += count * column.weight;
        }

        let new_total = total + term_weight;
        if new_total > 0 && new_total > total {
            total = new_total;
        } else {
            return None;
        }
    }

    Some(RowScore {
        weight: total,
        full_match,
    })
}

/// Score every row of `table` against the configured query.
///
/// `pool` bounds the worker count; `None` runs sequentially. Workers only
/// contend on the two accumulator locks, never on each other's row work.
/// A panic inside a caller-supplied hook propagates to the caller.
pub fn score_rows(
    table: &Table,
    config: &SearchConfig,
    pool: Option<&rayon::ThreadPool>,
) -> ScoredRows {
    let terms = tokenize(&config.query);
    let plan = plan_columns(table, config);

    let scores: Mutex<HashMap<usize, RowScore>> = Mutex::new(HashMap::new());
    let matched: Mutex<Vec<usize>> = Mutex::new(Vec::new());

    let evaluate = |index: usize, row: &Row| {
        if let Some(score) = score_row(table, row, &terms, &plan, config) {
            scores.lock().insert(index, score);
            matched.lock().push(index);
        }
    };

    match pool {
        Some(pool) => pool.install(|| {
            table
                .rows()
                .par_iter()
                .enumerate()
                .for_each(|(index, row)| evaluate(index, row));
        }),
        None => {
            for (index, row) in table.rows().iter().enumerate() {
                evaluate(index, row);
            }
        }
    }

    ScoredRows {
        scores: scores.into_inner(),
        matched: matched.into_inner(),
    }
}
