//! Cashback projection and investment round-up arithmetic.
//!
//! Both run on `amount_rounded`, never `amount`. Two-decimal rounding is a
//! serialization concern; nothing here rounds mid-calculation.

use std::collections::HashSet;

use tracing::debug;

use crate::aggregate::{Bucket, totals_by};
use crate::transaction::{TRANSFERS_CATEGORY, Transaction};

/// Projected cashback for a single rounded amount: percent applied, then
/// truncated toward zero (whole currency units, matching the bank's
/// projection rule).
pub fn projected_cashback(amount_rounded: f64, percent: f64) -> f64 {
    (amount_rounded * percent / 100.0).trunc()
}

/// Per-category projected cashback over an already-filtered expense set.
/// Transfers never earn projected cashback; the exclusion is merged into
/// whatever set the caller supplies.
pub fn cashback_by_category(
    records: &[Transaction],
    percent: f64,
    exclude: Option<&HashSet<String>>,
) -> Vec<Bucket> {
    let mut excluded: HashSet<String> = exclude.cloned().unwrap_or_default();
    excluded.insert(TRANSFERS_CATEGORY.to_string());

    totals_by(
        records,
        |tx| (!tx.category.is_empty()).then(|| tx.category.clone()),
        |tx| match (tx.amount, tx.amount_rounded) {
            (Some(_), Some(rounded)) => Some(projected_cashback(rounded, percent)),
            _ => None,
        },
        0,
        Some(&excluded),
    )
}

/// Round-up contribution for one rounded amount: the distance to the next
/// multiple of `limit` above it. Amounts already on a multiple contribute
/// nothing and return `None`, so they count neither toward the sum nor
/// toward the number of contributing records.
pub fn round_up_delta(amount_rounded: f64, limit: u32) -> Option<f64> {
    if limit == 0 {
        return None;
    }
    let step = f64::from(limit);
    if amount_rounded % step == 0.0 {
        return None;
    }
    let target = ((amount_rounded / step).floor() + 1.0) * step;
    Some(target - amount_rounded)
}

/// Total swept into the savings bucket across a filtered record set.
pub fn round_up_total(records: &[Transaction], limit: u32) -> f64 {
    let total = records
        .iter()
        .filter_map(|tx| tx.amount_rounded)
        .filter_map(|rounded| round_up_delta(rounded, limit))
        .sum();
    debug!(limit, total, "computed round-up total");
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Status;
    use chrono::NaiveDate;

    fn tx(category: &str, rounded: f64) -> Transaction {
        Transaction {
            occurred_at: NaiveDate::from_ymd_opt(2018, 1, 1)
                .unwrap()
                .and_hms_opt(12, 49, 53)
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
    fn test_projection_truncates_toward_zero() {
        assert_eq!(projected_cashback(316.0, 5.0), 15.0);
        assert_eq!(projected_cashback(21.0, 5.0), 1.0);
        assert_eq!(projected_cashback(19.0, 5.0), 0.0);
    }

    #[test]
    fn test_cashback_by_category() {
        let records = vec![tx("Beauty", 316.0), tx("Beauty", 21.0), tx("Supermarkets", 73.06)];
        let buckets = cashback_by_category(&records, 5.0, None);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "Beauty");
        assert_eq!(buckets[0].total, 16.0);
        assert_eq!(buckets[1].key, "Supermarkets");
        assert_eq!(buckets[1].total, 3.0);
    }

    #[test]
    fn test_transfers_always_excluded() {
        let records = vec![tx("Transfers", 3000.0), tx("Beauty", 316.0)];
        let buckets = cashback_by_category(&records, 5.0, None);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key, "Beauty");

        // Even an explicit caller set does not re-admit transfers.
        let exclude: HashSet<String> = [String::from("Beauty")].into();
        let buckets = cashback_by_category(&records, 5.0, Some(&exclude));
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_round_up_delta() {
        let delta = round_up_delta(73.06, 50).unwrap();
        assert!((delta - 26.94).abs() < 1e-9);
        assert_eq!(round_up_delta(50.0, 50), None);
        assert_eq!(round_up_delta(7.0, 10).map(f64::round), Some(3.0));
    }

    #[test]
    fn test_round_up_total_skips_exact_multiples() {
        let records = vec![tx("Supermarkets", 73.06), tx("Beauty", 50.0), tx("Beauty", 21.0)];
        let total = round_up_total(&records, 50);
        // 26.94 + 29.0; the exact multiple contributes nothing at all.
        assert!((total - 55.94).abs() < 1e-9);

        let contributing = records
            .iter()
            .filter_map(|t| t.amount_rounded)
            .filter_map(|r| round_up_delta(r, 50))
            .count();
        assert_eq!(contributing, 2);
    }

    #[test]
    fn test_round_up_missing_amounts_skipped() {
        let mut missing = tx("Beauty", 1.0);
        missing.amount_rounded = None;
        assert_eq!(round_up_total(&[missing], 50), 0.0);
    }
}
