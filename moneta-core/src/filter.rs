//! Predicate evaluation over transaction sets. Filters never mutate their
//! input; matched records are cloned out, with amounts normalized to
//! absolute values so downstream consumers report magnitudes.

use std::collections::HashSet;

use tracing::debug;

use crate::transaction::{Status, Transaction};
use crate::window::DateWindow;

/// Optional criteria applied on top of the date window. Defaults mirror the
/// common reporting case: settled expenses.
#[derive(Debug, Clone)]
pub struct FilterOptions<'a> {
    pub status: Status,
    /// Keep only this category (exact, case-sensitive) when set.
    pub category: Option<&'a str>,
    /// Drop any record whose category is in this set.
    pub exclude_categories: Option<&'a HashSet<String>>,
    /// true keeps expenses (`amount < 0`), false keeps income
    /// (`amount > 0`). Zero or missing amounts are dropped either way.
    pub expense: bool,
}

impl Default for FilterOptions<'_> {
    fn default() -> Self {
        Self {
            status: Status::Ok,
            category: None,
            exclude_categories: None,
            expense: true,
        }
    }
}

/// Keep records whose `occurred_at` falls inside the window, both bounds
/// inclusive. No normalization; applying the same window twice returns the
/// same set.
pub fn in_window(records: &[Transaction], window: &DateWindow) -> Vec<Transaction> {
    // Bounds may arrive swapped from hand-built windows.
    let window = DateWindow::new(window.start, window.end);
    records
        .iter()
        .filter(|tx| window.contains(tx.occurred_at))
        .cloned()
        .collect()
}

/// Keep records whose category is in `categories`.
pub fn with_categories(records: &[Transaction], categories: &HashSet<String>) -> Vec<Transaction> {
    records
        .iter()
        .filter(|tx| categories.contains(&tx.category))
        .cloned()
        .collect()
}

/// Full spending filter: window, status, category in/exclusion, and amount
/// sign. Output records carry `amount` and `amount_rounded` as absolute
/// values.
pub fn filter_spending(
    records: &[Transaction],
    window: &DateWindow,
    opts: &FilterOptions,
) -> Vec<Transaction> {
    let window = DateWindow::new(window.start, window.end);
    let out: Vec<Transaction> = records
        .iter()
        .filter(|tx| {
            window.contains(tx.occurred_at)
                && tx.status == opts.status
                && opts.category.is_none_or(|wanted| tx.category == wanted)
                && !opts
                    .exclude_categories
                    .is_some_and(|set| set.contains(&tx.category))
                && matches_sign(tx.amount, opts.expense)
        })
        .map(normalized)
        .collect();
    debug!(
        matched = out.len(),
        total = records.len(),
        expense = opts.expense,
        "filtered spending records"
    );
    out
}

fn matches_sign(amount: Option<f64>, expense: bool) -> bool {
    match amount {
        Some(a) if expense => a < 0.0,
        Some(a) => a > 0.0,
        None => false,
    }
}

fn normalized(tx: &Transaction) -> Transaction {
    let mut out = tx.clone();
    out.amount = out.amount.map(f64::abs);
    out.amount_rounded = out.amount_rounded.map(f64::abs);
    out
}
