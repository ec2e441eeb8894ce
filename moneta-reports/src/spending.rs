//! Spending reports over a rolling window: by category, by weekday, and by
//! workday/weekend. The window reaches three calendar months back from the
//! supplied date, or from the current instant when none is given.

use chrono::{Datelike, Local, NaiveDateTime, Weekday};

use moneta_core::{
    Bucket, FilterOptions, Period, Transaction, averages_by, filter_spending, resolve, totals_by,
};

/// How many calendar months the spending reports look back.
pub const REPORT_MONTHS_BACK: u32 = 3;

const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WORKDAY: &str = "Workday";
const WEEKEND: &str = "Weekend";

/// Spending in one category over the report window, as a single-bucket
/// aggregate (empty when the category saw no expenses).
pub fn spending_by_category(
    records: &[Transaction],
    category: &str,
    date: Option<NaiveDateTime>,
) -> Vec<Bucket> {
    let opts = FilterOptions {
        category: Some(category),
        ..Default::default()
    };
    let spending = filter_spending(records, &report_window(date), &opts);
    totals_by(
        &spending,
        |tx| (!tx.category.is_empty()).then(|| tx.category.clone()),
        |tx| tx.amount,
        0,
        None,
    )
}

/// Average spend per weekday over the report window, Monday through Sunday;
/// days without expenses are omitted.
pub fn spending_by_weekday(
    records: &[Transaction],
    date: Option<NaiveDateTime>,
) -> Vec<Bucket> {
    let spending = filter_spending(records, &report_window(date), &FilterOptions::default());
    let means = averages_by(&spending, |tx| {
        Some(weekday_label(tx.occurred_at.weekday()).to_string())
    });
    WEEKDAY_ORDER
        .iter()
        .filter_map(|day| means.iter().find(|bucket| bucket.key == *day).cloned())
        .collect()
}

/// Average spend on working days versus weekend days over the report window.
pub fn spending_by_workday(
    records: &[Transaction],
    date: Option<NaiveDateTime>,
) -> Vec<Bucket> {
    let spending = filter_spending(records, &report_window(date), &FilterOptions::default());
    averages_by(&spending, |tx| {
        let label = if tx.occurred_at.weekday().num_days_from_monday() < 5 {
            WORKDAY
        } else {
            WEEKEND
        };
        Some(label.to_string())
    })
}

fn report_window(date: Option<NaiveDateTime>) -> moneta_core::DateWindow {
    let anchor = date.unwrap_or_else(|| Local::now().naive_local());
    resolve(anchor, Period::MonthsBack(REPORT_MONTHS_BACK))
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moneta_core::Status;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(14, 55, 21)
            .unwrap()
    }

    fn tx(y: i32, m: u32, d: u32, amount: f64, category: &str) -> Transaction {
        Transaction {
            occurred_at: at(y, m, d),
            card_number: Some("*7197".to_string()),
            status: Status::Ok,
            amount: Some(amount),
            amount_rounded: Some(amount),
            cashback_bonus: 0.0,
            category: category.to_string(),
            description: "OOO Balid".to_string(),
        }
    }

    #[test]
    fn test_spending_by_category_three_month_window() {
        let records = vec![
            tx(2018, 1, 1, -316.0, "Beauty"),
            tx(2018, 1, 3, -21.0, "Beauty"),
            // Outside the window and wrong sign respectively.
            tx(2017, 9, 1, -1000.0, "Beauty"),
            tx(2018, 1, 23, 21.0, "Beauty"),
        ];
        let buckets = spending_by_category(&records, "Beauty", Some(at(2018, 1, 31)));
        assert_eq!(buckets.len(), 1);
        assert!((buckets[0].total - 337.0).abs() < 1e-9);
    }

    #[test]
    fn test_spending_by_category_unknown_category_is_empty() {
        let records = vec![tx(2018, 1, 1, -316.0, "Beauty")];
        assert!(spending_by_category(&records, "Supermarkets", Some(at(2018, 1, 31))).is_empty());
    }

    #[test]
    fn test_spending_by_weekday_ordered_means() {
        // 2021-12-20 is a Monday, 2021-12-26 a Sunday.
        let records = vec![
            tx(2021, 12, 26, -90.0, "Supermarkets"),
            tx(2021, 12, 20, -10.0, "Supermarkets"),
            tx(2021, 12, 20, -30.0, "Beauty"),
        ];
        let buckets = spending_by_weekday(&records, Some(at(2021, 12, 31)));
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "Monday");
        assert!((buckets[0].total - 20.0).abs() < 1e-9);
        assert_eq!(buckets[1].key, "Sunday");
        assert!((buckets[1].total - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_spending_by_workday_split() {
        let records = vec![
            tx(2021, 12, 20, -40.0, "Supermarkets"), // Monday
            tx(2021, 12, 24, -20.0, "Supermarkets"), // Friday
            tx(2021, 12, 25, -100.0, "Beauty"),      // Saturday
        ];
        let buckets = spending_by_workday(&records, Some(at(2021, 12, 31)));
        assert_eq!(buckets.len(), 2);
        let workday = buckets.iter().find(|b| b.key == WORKDAY).unwrap();
        let weekend = buckets.iter().find(|b| b.key == WEEKEND).unwrap();
        assert!((workday.total - 30.0).abs() < 1e-9);
        assert!((weekend.total - 100.0).abs() < 1e-9);
    }
}
