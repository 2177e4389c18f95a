//! Result assembly: full-match narrowing, stable multi-key ordering, and
//! truncation.
//!
//! The final ordering must be deterministic no matter which worker finished
//! first, so matched rows are put back into input order before the stable
//! sort runs. Ties on every active key therefore keep their original
//! relative input order.

use std::cmp::Ordering;

use crate::config::{OrderKey, SearchConfig, SortDirection};
use crate::scoring::ScoredRows;
use crate::table::{Table, Value};

/// Build the final ranked table from a scoring pass.
///
/// Zero matches produce an empty table with the input's column schema, so
/// callers can always reason about the output shape.
pub fn assemble(table: &Table, scored: ScoredRows, config: &SearchConfig) -> Table {
    let ScoredRows { scores, mut matched } = scored;

    if matched.is_empty() {
        return table.empty_like();
    }

    // Narrow to full matches only when at least one exists; otherwise fall
    // back to partial matches unchanged.
    if config.take_full_match_only_when_found
        && matched
            .iter()
            .any(|index| scores.get(index).is_some_and(|score| score.full_match))
    {
        matched.retain(|index| scores.get(index).is_some_and(|score| score.full_match));
    }

    // Completion order is nondeterministic under parallel scoring; restore
    // input order so the stable sort below breaks ties deterministically.
    matched.sort_unstable();

    let mut keys: Vec<(&String, &OrderKey)> = config.order_by.iter().collect();
    keys.sort_by_key(|(_, key)| key.priority);

    let weight_of = |index: &usize| scores.get(index).map_or(0, |score| score.weight);

    matched.sort_by(|a, b| {
        if config.order_by_weight_first {
            let by_weight = weight_of(b).cmp(&weight_of(a));
            if by_weight != Ordering::Equal {
                return by_weight;
            }
        }
        for &(column, key) in &keys {
            let by_key = compare_column(table, *a, *b, column, key);
            if by_key != Ordering::Equal {
                return by_key;
            }
        }
        Ordering::Equal
    });

    let take = if config.max_return > 0 {
        config.max_return.min(matched.len())
    } else {
        matched.len()
    };

    let mut ranked = table.empty_like();
    for &index in matched.iter().take(take) {
        if let Some(row) = table.row(index) {
            ranked.push_row(row.clone());
        }
    }
    ranked
}

/// Compare two rows on one order-by column.
///
/// Blank values (null cells, empty strings, unknown columns) group before
/// non-blank values regardless of the requested direction; within the
/// non-blank group the direction applies to the string-converted value.
fn compare_column(table: &Table, a: usize, b: usize, column: &str, key: &OrderKey) -> Ordering {
    let text_a = column_text(table, a, column);
    let text_b = column_text(table, b, column);

    match (text_a.is_empty(), text_b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    match key.direction {
        SortDirection::Ascending => text_a.cmp(&text_b),
        SortDirection::Descending => text_b.cmp(&text_a),
    }
}

fn column_text(table: &Table, row: usize, column: &str) -> String {
    table
        .value(row, column)
        .map(Value::to_text)
        .unwrap_or_default()
}
