//! Dashboard view assembly.
//!
//! Pure over already-materialized inputs: the caller fetches market data and
//! the wall-clock instant, the views only compose core results into JSON.
//! A payload that fails to serialize becomes `{}` so a rendering bug never
//! crashes the report pipeline.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDateTime, Timelike};
use serde_json::{Value, json};
use tracing::warn;

use moneta_core::{
    CASH_CATEGORY, FilterOptions, Period, STATEMENT_DATE_FORMAT, TRANSFERS_CATEGORY, Transaction,
    card_totals, filter_spending, resolve, top_transactions, total_amount, totals_by_category,
    with_categories,
};

/// How many records the main dashboard lists.
const TOP_TRANSACTIONS_LIMIT: usize = 5;
/// How many expense categories the events view names before folding the
/// rest into "Other".
const EVENTS_TOP_CATEGORIES: usize = 7;

/// Market lookups, already fetched (or defaulted to empty on failure).
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub currency_rates: HashMap<String, f64>,
    pub stock_prices: HashMap<String, f64>,
}

/// Part-of-day greeting for the dashboard header, from the call-time clock.
pub fn greeting(now: NaiveDateTime) -> &'static str {
    match now.hour() {
        0..6 => "Good night",
        6..12 => "Good morning",
        12..18 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Main dashboard: month-to-anchor spending per card, the five largest
/// transactions, and the market blocks.
pub fn main_dashboard(
    records: &[Transaction],
    anchor: NaiveDateTime,
    now: NaiveDateTime,
    market: &MarketData,
) -> String {
    let window = resolve(anchor, Period::Month);
    let spending = filter_spending(records, &window, &FilterOptions::default());

    let cards: Vec<Value> = card_totals(&spending)
        .iter()
        .map(|card| {
            json!({
                "last_digits": card.last_digits,
                "total_spent": round2(card.spent),
                "cashback": round2(card.cashback),
            })
        })
        .collect();

    let top: Vec<Value> = top_transactions(&spending, TOP_TRANSACTIONS_LIMIT)
        .iter()
        .map(|tx| {
            json!({
                "date": tx.occurred_at.format(STATEMENT_DATE_FORMAT).to_string(),
                "amount": round2(tx.amount_rounded.unwrap_or(0.0)),
                "category": tx.category,
                "description": tx.description,
            })
        })
        .collect();

    to_json(json!({
        "greeting": greeting(now),
        "cards": cards,
        "top_transactions": top,
        "currency_rates": currency_block(&market.currency_rates),
        "stock_prices": stock_block(&market.stock_prices),
    }))
}

/// Events dashboard for a `W|M|Y|ALL` window: expense totals with a top-7
/// category list plus a transfers-and-cash breakout, income totals, and the
/// market blocks.
pub fn events_dashboard(
    records: &[Transaction],
    anchor: NaiveDateTime,
    period: Period,
    market: &MarketData,
) -> String {
    let window = resolve(anchor, period);
    let breakout: HashSet<String> = [
        TRANSFERS_CATEGORY.to_string(),
        CASH_CATEGORY.to_string(),
    ]
    .into();

    let expenses = filter_spending(records, &window, &FilterOptions::default());
    let main: Vec<Value> = totals_by_category(&expenses, EVENTS_TOP_CATEGORIES, Some(&breakout))
        .iter()
        .map(bucket_entry)
        .collect();
    let transfers_and_cash: Vec<Value> =
        totals_by_category(&with_categories(&expenses, &breakout), 0, None)
            .iter()
            .map(bucket_entry)
            .collect();

    let income_opts = FilterOptions {
        expense: false,
        ..Default::default()
    };
    let income = filter_spending(records, &window, &income_opts);
    let income_main: Vec<Value> = totals_by_category(&income, 0, None)
        .iter()
        .map(bucket_entry)
        .collect();

    to_json(json!({
        "expenses": {
            "total_amount": round2(total_amount(&expenses)),
            "main": main,
            "transfers_and_cash": transfers_and_cash,
        },
        "income": {
            "total_amount": round2(total_amount(&income)),
            "main": income_main,
        },
        "currency_rates": currency_block(&market.currency_rates),
        "stock_prices": stock_block(&market.stock_prices),
    }))
}

fn bucket_entry(bucket: &moneta_core::Bucket) -> Value {
    json!({ "category": bucket.key, "amount": round2(bucket.total) })
}

fn currency_block(rates: &HashMap<String, f64>) -> Vec<Value> {
    sorted_pairs(rates)
        .into_iter()
        .map(|(currency, rate)| json!({ "currency": currency, "rate": round2(rate) }))
        .collect()
}

fn stock_block(prices: &HashMap<String, f64>) -> Vec<Value> {
    sorted_pairs(prices)
        .into_iter()
        .map(|(stock, price)| json!({ "stock": stock, "price": round2(price) }))
        .collect()
}

fn sorted_pairs(map: &HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut pairs: Vec<(String, f64)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn to_json(payload: Value) -> String {
    match serde_json::to_string(&payload) {
        Ok(rendered) => rendered,
        Err(error) => {
            warn!(%error, "serializing report payload failed, returning empty payload");
            "{}".to_string()
        }
    }
}
