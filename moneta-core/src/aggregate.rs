//! Grouped sums over transaction sets: category/card bucketing, top-N
//! truncation with a remainder bucket, per-key means, and magnitude-ordered
//! record lists.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::transaction::Transaction;

/// Key for the synthetic remainder bucket appended by top-N truncation.
pub const OTHER_BUCKET: &str = "Other";

/// One aggregation entry. Built per call and discarded after rendering;
/// nothing is cached across calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub total: f64,
}

/// Per-card entry tracking two running sums: spend and bank-reported
/// cashback bonuses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardBucket {
    pub last_digits: String,
    pub spent: f64,
    pub cashback: f64,
}

/// Sum `value_fn` grouped by `key_fn`, sorted descending by total. Ties keep
/// first-seen order (the accumulation tracks encounter order and the sort is
/// stable). Records where either closure returns `None` are skipped, as are
/// keys in `exclude`.
///
/// With `top_n > 0`, entries past the first `top_n` are folded into a final
/// `"Other"` bucket; an empty result never grows a synthetic key.
pub fn totals_by<K, V>(
    records: &[Transaction],
    key_fn: K,
    value_fn: V,
    top_n: usize,
    exclude: Option<&HashSet<String>>,
) -> Vec<Bucket>
where
    K: Fn(&Transaction) -> Option<String>,
    V: Fn(&Transaction) -> Option<f64>,
{
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();

    for tx in records {
        let Some(key) = key_fn(tx) else { continue };
        if exclude.is_some_and(|set| set.contains(&key)) {
            continue;
        }
        let Some(value) = value_fn(tx) else { continue };
        if !sums.contains_key(&key) {
            order.push(key.clone());
        }
        *sums.entry(key).or_insert(0.0) += value;
    }

    let mut buckets: Vec<Bucket> = order
        .into_iter()
        .map(|key| {
            let total = sums.remove(&key).unwrap_or(0.0);
            Bucket { key, total }
        })
        .collect();
    buckets.sort_by(|a, b| b.total.total_cmp(&a.total));

    if top_n > 0 && buckets.len() > top_n {
        let rest: f64 = buckets[top_n..].iter().map(|b| b.total).sum();
        buckets.truncate(top_n);
        buckets.push(Bucket {
            key: OTHER_BUCKET.to_string(),
            total: rest,
        });
    }

    debug!(buckets = buckets.len(), top_n, "aggregated totals");
    buckets
}

/// Rounded-amount totals per category. Records missing a category, amount,
/// or rounded amount are incomplete and skipped.
pub fn totals_by_category(
    records: &[Transaction],
    top_n: usize,
    exclude: Option<&HashSet<String>>,
) -> Vec<Bucket> {
    totals_by(
        records,
        |tx| (!tx.category.is_empty()).then(|| tx.category.clone()),
        |tx| match (tx.amount, tx.amount_rounded) {
            (Some(_), Some(rounded)) => Some(rounded),
            _ => None,
        },
        top_n,
        exclude,
    )
}

/// Spend and bank-reported cashback per card suffix, sorted by spend
/// descending (first-seen order on ties). Records without a card identifier
/// or either amount field are incomplete and skipped.
pub fn card_totals(records: &[Transaction]) -> Vec<CardBucket> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, f64)> = HashMap::new();

    for tx in records {
        let Some(suffix) = tx.card_suffix() else { continue };
        let (Some(_), Some(rounded)) = (tx.amount, tx.amount_rounded) else {
            continue;
        };
        let key = suffix.to_string();
        if !sums.contains_key(&key) {
            order.push(key.clone());
        }
        let entry = sums.entry(key).or_insert((0.0, 0.0));
        entry.0 += rounded;
        entry.1 += tx.cashback_bonus;
    }

    let mut cards: Vec<CardBucket> = order
        .into_iter()
        .map(|key| {
            let (spent, cashback) = sums.remove(&key).unwrap_or((0.0, 0.0));
            CardBucket {
                last_digits: key,
                spent,
                cashback,
            }
        })
        .collect();
    cards.sort_by(|a, b| b.spent.total_cmp(&a.spent));
    cards
}

/// Mean of `amount` grouped by `key_fn`, in first-seen key order. Used by
/// the weekday/workday reports; callers impose their own display order.
pub fn averages_by<K>(records: &[Transaction], key_fn: K) -> Vec<Bucket>
where
    K: Fn(&Transaction) -> Option<String>,
{
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();

    for tx in records {
        let Some(key) = key_fn(tx) else { continue };
        let Some(amount) = tx.amount else { continue };
        if !sums.contains_key(&key) {
            order.push(key.clone());
        }
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += amount;
        entry.1 += 1;
    }

    order
        .into_iter()
        .filter_map(|key| {
            let (sum, count) = sums.remove(&key)?;
            (count > 0).then(|| Bucket {
                key,
                total: sum / count as f64,
            })
        })
        .collect()
}

/// Records ordered by amount magnitude descending (expects the filter's
/// normalized output), truncated to `limit` when nonzero.
pub fn top_transactions(records: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut out: Vec<Transaction> = records.to_vec();
    out.sort_by(|a, b| b.amount.unwrap_or(0.0).total_cmp(&a.amount.unwrap_or(0.0)));
    if limit > 0 {
        out.truncate(limit);
    }
    out
}

/// Sum of rounded amounts over an already-filtered set.
pub fn total_amount(records: &[Transaction]) -> f64 {
    records.iter().filter_map(|tx| tx.amount_rounded).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Status;
    use chrono::NaiveDate;

    fn tx(category: &str, rounded: f64) -> Transaction {
        Transaction {
            occurred_at: NaiveDate::from_ymd_opt(2021, 12, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            card_number: Some("*7197".to_string()),
            status: Status::Ok,
            amount: Some(rounded),
            amount_rounded: Some(rounded),
            cashback_bonus: 0.0,
            category: category.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_top_n_folds_remainder() {
        let records = vec![
            tx("Transfers", 3000.0),
            tx("Beauty", 316.0),
            tx("Beauty", 21.0),
            tx("Supermarkets", 73.06),
        ];
        let buckets = totals_by_category(&records, 1, None);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "Transfers");
        assert_eq!(buckets[0].total, 3000.0);
        assert_eq!(buckets[1].key, OTHER_BUCKET);
        assert!((buckets[1].total - 410.06).abs() < 1e-9);
    }

    #[test]
    fn test_no_synthetic_bucket_when_within_top_n() {
        let records = vec![tx("Beauty", 316.0)];
        let buckets = totals_by_category(&records, 5, None);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key, "Beauty");
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert!(totals_by_category(&[], 3, None).is_empty());
        assert!(card_totals(&[]).is_empty());
    }

    #[test]
    fn test_sorted_descending_ties_keep_first_seen_order() {
        let records = vec![
            tx("Beauty", 100.0),
            tx("Supermarkets", 100.0),
            tx("Transfers", 100.0),
        ];
        let buckets = totals_by_category(&records, 0, None);
        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, ["Beauty", "Supermarkets", "Transfers"]);
    }

    #[test]
    fn test_bucket_totals_preserve_input_sum() {
        let records = vec![
            tx("Transfers", 3000.0),
            tx("Beauty", 316.0),
            tx("Beauty", 21.0),
            tx("Supermarkets", 73.06),
        ];
        let input_sum: f64 = records.iter().filter_map(|t| t.amount_rounded).sum();
        for top_n in [0, 1, 2, 10] {
            let buckets = totals_by_category(&records, top_n, None);
            let bucket_sum: f64 = buckets.iter().map(|b| b.total).sum();
            assert!((bucket_sum - input_sum).abs() < 1e-9, "top_n={top_n}");
        }
    }

    #[test]
    fn test_incomplete_records_skipped() {
        let mut incomplete = tx("Beauty", 50.0);
        incomplete.amount_rounded = None;
        let mut uncategorized = tx("", 70.0);
        uncategorized.category.clear();
        let records = vec![tx("Beauty", 10.0), incomplete, uncategorized];

        let buckets = totals_by_category(&records, 0, None);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total, 10.0);
    }

    #[test]
    fn test_card_totals_tracks_both_sums() {
        let mut a = tx("Beauty", 160.89);
        a.cashback_bonus = 3.0;
        let mut b = tx("Supermarkets", 64.0);
        b.cashback_bonus = 1.0;
        let mut other_card = tx("Beauty", 5000.0);
        other_card.card_number = Some("*4556".to_string());
        let mut no_card = tx("Beauty", 999.0);
        no_card.card_number = None;

        let cards = card_totals(&[a, b, other_card, no_card]);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].last_digits, "4556");
        assert_eq!(cards[1].last_digits, "7197");
        assert!((cards[1].spent - 224.89).abs() < 1e-9);
        assert!((cards[1].cashback - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_averages() {
        let records = vec![tx("Beauty", 10.0), tx("Beauty", 20.0), tx("Supermarkets", 5.0)];
        let means = averages_by(&records, |t| Some(t.category.clone()));
        assert_eq!(means[0].key, "Beauty");
        assert!((means[0].total - 15.0).abs() < 1e-9);
        assert!((means[1].total - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_transactions_limit() {
        let records = vec![tx("A", 10.0), tx("B", 300.0), tx("C", 50.0)];
        let top = top_transactions(&records, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].category, "B");
        assert_eq!(top[1].category, "C");

        let all = top_transactions(&records, 0);
        assert_eq!(all.len(), 3);
    }
}
