//! Statement services: beneficial-cashback analysis, the investment
//! round-up, and the search endpoints. Each returns the JSON the menu layer
//! prints, computed entirely from core operations.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::json;
use tracing::warn;

use moneta_core::{
    DateWindow, FilterOptions, TRANSFERS_CATEGORY, Transaction, cashback_by_category,
    filter_spending, round_up_total, search_keyword, search_person_transfers, search_phone,
};

use crate::views::to_json;

/// Projected cashback per category for one calendar month, as a JSON object
/// of whole currency units, most profitable category first by construction
/// of the underlying aggregation (object key order mirrors it).
pub fn beneficial_cashback_categories(
    records: &[Transaction],
    year: i32,
    month: u32,
    percent: f64,
) -> String {
    let Some(window) = month_window(year, month) else {
        warn!(year, month, "invalid cashback month requested");
        return "{}".to_string();
    };
    let spending = filter_spending(records, &window, &FilterOptions::default());
    let buckets = cashback_by_category(&spending, percent, None);

    // serde_json::Map keeps insertion order, so the object mirrors the
    // aggregation's descending order.
    let mut payload = serde_json::Map::new();
    for bucket in buckets {
        payload.insert(bucket.key, json!(bucket.total as i64));
    }
    to_json(payload.into())
}

/// Round-up sweep for one calendar month (`YYYY-MM`) at the given limit.
/// Settled expenses only; transfers never feed the savings bucket.
pub fn investment_roundup(records: &[Transaction], month: &str, limit: u32) -> Result<f64> {
    let start = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .with_context(|| format!("parsing investment month `{month}`"))?
        .and_hms_opt(0, 0, 0)
        .context("building month start")?;
    let window = month_window_from(start);

    let exclude: HashSet<String> = [TRANSFERS_CATEGORY.to_string()].into();
    let opts = FilterOptions {
        exclude_categories: Some(&exclude),
        ..Default::default()
    };
    let spending = filter_spending(records, &window, &opts);
    Ok(round_up_total(&spending, limit))
}

/// Free-text keyword search rendered as a JSON array of transactions.
pub fn keyword_search_json(records: &[Transaction], keyword: &str) -> String {
    render_matches(search_keyword(records, keyword))
}

/// Transactions carrying a mobile number in their description.
pub fn phone_search_json(records: &[Transaction]) -> String {
    render_matches(search_phone(records))
}

/// Transfers to private persons (name plus initial in the description).
pub fn person_transfers_json(records: &[Transaction]) -> String {
    render_matches(search_person_transfers(records))
}

fn render_matches(matches: Result<Vec<Transaction>>) -> String {
    match matches {
        Ok(found) => to_json(json!(found)),
        Err(error) => {
            warn!(%error, "search failed, returning empty result");
            "[]".to_string()
        }
    }
}

fn month_window(year: i32, month: u32) -> Option<DateWindow> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    Some(month_window_from(start))
}

fn month_window_from(start: NaiveDateTime) -> DateWindow {
    let end = start
        .checked_add_months(Months::new(1))
        .map(|next| next - TimeDelta::seconds(1))
        .unwrap_or(start);
    DateWindow::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moneta_core::Status;
    use serde_json::Value;

    fn tx(day: u32, rounded: f64, category: &str, description: &str) -> Transaction {
        Transaction {
            occurred_at: NaiveDate::from_ymd_opt(2018, 1, day)
                .unwrap()
                .and_hms_opt(12, 49, 53)
                .unwrap(),
            card_number: Some("*7197".to_string()),
            status: Status::Ok,
            amount: Some(-rounded),
            amount_rounded: Some(-rounded),
            cashback_bonus: 0.0,
            category: category.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_beneficial_cashback_month() {
        let records = vec![
            tx(1, 316.0, "Beauty", "OOO Balid"),
            tx(3, 21.0, "Beauty", "OOO Balid"),
            tx(5, 3000.0, "Transfers", "Valery A."),
            tx(7, 73.06, "Supermarkets", "Kolhoz"),
        ];
        let rendered = beneficial_cashback_categories(&records, 2018, 1, 5.0);
        let payload: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(payload["Beauty"], 16);
        assert_eq!(payload["Supermarkets"], 3);
        assert!(payload.get("Transfers").is_none());
    }

    #[test]
    fn test_beneficial_cashback_other_months_excluded() {
        let mut outside = tx(1, 316.0, "Beauty", "OOO Balid");
        outside.occurred_at = NaiveDate::from_ymd_opt(2018, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rendered = beneficial_cashback_categories(&[outside], 2018, 1, 5.0);
        assert_eq!(rendered, "{}");
    }

    #[test]
    fn test_investment_roundup() {
        let records = vec![
            tx(1, 73.06, "Supermarkets", "Kolhoz"),
            tx(2, 50.0, "Beauty", "OOO Balid"),
            tx(3, 21.0, "Beauty", "OOO Balid"),
            tx(4, 500.0, "Transfers", "Valery A."),
        ];
        let total = investment_roundup(&records, "2018-01", 50).unwrap();
        assert!((total - 55.94).abs() < 1e-9);
    }

    #[test]
    fn test_investment_roundup_bad_month() {
        assert!(investment_roundup(&[], "January", 50).is_err());
    }

    #[test]
    fn test_keyword_search_json() {
        let records = vec![
            tx(1, 100.0, "Supermarkets", "Kolhoz"),
            tx(2, 50.0, "Beauty", "OOO Balid"),
        ];
        let rendered = keyword_search_json(&records, "kolhoz");
        let payload: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(payload.as_array().unwrap().len(), 1);
        assert_eq!(payload[0]["description"], "Kolhoz");
        assert_eq!(payload[0]["status"], "OK");
    }

    #[test]
    fn test_phone_and_person_search_json() {
        let records = vec![
            tx(1, 100.0, "Telecom", "MTS +7 921 111-22-33"),
            tx(2, 3000.0, "Transfers", "Valery A."),
            tx(3, 50.0, "Beauty", "OOO Balid"),
        ];
        let phones: Value = serde_json::from_str(&phone_search_json(&records)).unwrap();
        assert_eq!(phones.as_array().unwrap().len(), 1);

        let persons: Value = serde_json::from_str(&person_transfers_json(&records)).unwrap();
        assert_eq!(persons.as_array().unwrap().len(), 1);
        assert_eq!(persons[0]["category"], "Transfers");
    }
}
