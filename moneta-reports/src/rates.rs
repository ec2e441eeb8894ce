//! Exchange-rate and stock-price lookups.
//!
//! Thin clients over the apilayer exchangerates-data and twelvedata APIs.
//! Each returns a symbol -> value mapping or an error; callers degrade to an
//! empty mapping so a dead network never takes a report down with it.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate};
use reqwest::Client;
use tracing::info;

pub const EXCHANGE_API_URL: &str = "https://api.apilayer.com/exchangerates_data/";
pub const STOCKS_API_URL: &str = "https://api.twelvedata.com/time_series";

/// How far back the stock lookup may reach for the latest close.
const STOCKS_LOOKBACK_DAYS: u64 = 10;

/// Rate of one unit of each requested currency in rubles on the given date,
/// rounded to two decimals.
pub async fn fetch_currency_rates(
    client: &Client,
    on_date: NaiveDate,
    symbols: &[String],
    api_key: &str,
) -> Result<HashMap<String, f64>> {
    if symbols.is_empty() {
        return Ok(HashMap::new());
    }

    let url = format!("{EXCHANGE_API_URL}{}", on_date.format("%Y-%m-%d"));
    let joined = symbols.join(",");
    let response = client
        .get(&url)
        .header("apikey", api_key)
        .query(&[("base", "RUB"), ("symbols", joined.as_str())])
        .send()
        .await
        .context("requesting exchange rates")?;
    if !response.status().is_success() {
        bail!("exchange rates request failed: {}", response.status());
    }

    let body: serde_json::Value = response.json().await.context("decoding exchange rates")?;
    let Some(rates) = body.get("rates").and_then(|v| v.as_object()) else {
        bail!("exchange rates response carries no `rates` object");
    };

    // The API quotes RUB-per-base; invert to rubles per unit of currency.
    let mut out = HashMap::new();
    for (symbol, value) in rates {
        let rate = value.as_f64().unwrap_or(0.0);
        let inverted = if rate != 0.0 { 1.0 / rate } else { 0.0 };
        out.insert(symbol.clone(), (inverted * 100.0).round() / 100.0);
    }
    info!(currencies = out.len(), "fetched exchange rates");
    Ok(out)
}

/// Latest close for each requested ticker within a ten-day lookback ending
/// on the given date.
pub async fn fetch_stock_prices(
    client: &Client,
    on_date: NaiveDate,
    symbols: &[String],
    api_key: &str,
) -> Result<HashMap<String, f64>> {
    if symbols.is_empty() {
        return Ok(HashMap::new());
    }

    let start = on_date
        .checked_sub_days(Days::new(STOCKS_LOOKBACK_DAYS))
        .unwrap_or(on_date);
    let start_date = format!("{} 00:00:00", start.format("%Y-%m-%d"));
    let end_date = format!("{} 23:59:59", on_date.format("%Y-%m-%d"));

    let mut out = HashMap::new();
    for symbol in symbols {
        let response = client
            .get(STOCKS_API_URL)
            .query(&[
                ("interval", "1day"),
                ("symbol", symbol.as_str()),
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
                ("apikey", api_key),
                ("dp", "2"),
            ])
            .send()
            .await
            .with_context(|| format!("requesting stock prices for {symbol}"))?;
        if !response.status().is_success() {
            bail!("stock price request for {symbol} failed: {}", response.status());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("decoding stock prices for {symbol}"))?;
        let close = body
            .get("values")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("close"))
            .and_then(|v| v.as_str())
            .and_then(|v| v.parse::<f64>().ok());
        if let Some(price) = close {
            out.insert(symbol.clone(), price);
        }
    }
    info!(stocks = out.len(), "fetched stock prices");
    Ok(out)
}
