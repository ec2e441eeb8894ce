use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use moneta_core::{Period, Transaction};
use moneta_ingest::parse_statement_csv;
use moneta_reports::persist::save_report;
use moneta_reports::rates::{fetch_currency_rates, fetch_stock_prices};
use moneta_reports::services::{
    beneficial_cashback_categories, investment_roundup, keyword_search_json,
    person_transfers_json, phone_search_json,
};
use moneta_reports::settings::load_settings;
use moneta_reports::spending::{spending_by_category, spending_by_weekday, spending_by_workday};
use moneta_reports::views::{events_dashboard, main_dashboard};
use moneta_reports::{MarketData, UserSettings};

const ANCHOR_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ROUND_UP_LIMITS: [u32; 3] = [10, 50, 100];

#[derive(Parser, Debug)]
#[command(name = "moneta", version, about = "Bank statement analysis CLI")]
struct Cli {
    /// Path to the statement CSV export
    #[arg(long, default_value = "operations.csv")]
    csv: PathBuf,

    /// Path to the user settings file (tracked currencies and stocks)
    #[arg(long, default_value = "user_settings.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Main dashboard JSON for the month of the given instant
    Dashboard {
        /// Anchor instant, "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        date: String,
    },

    /// Events dashboard JSON over a period ending at the given instant
    Events {
        /// Anchor instant, "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        date: String,

        /// Period code: W, M, Y or ALL
        #[arg(long, default_value = "M")]
        period: String,
    },

    /// Projected cashback per category for one calendar month
    Cashback {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,

        /// Cashback percentage, e.g. 5.0
        #[arg(long, default_value_t = 5.0)]
        percent: f64,
    },

    /// Investment round-up total for one calendar month
    Invest {
        /// Month, "YYYY-MM"
        #[arg(long)]
        month: String,

        /// Rounding limit: 10, 50 or 100
        #[arg(long)]
        limit: u32,
    },

    /// Free-text keyword search over descriptions and categories
    Search {
        keyword: String,
    },

    /// Transactions with a mobile number in the description
    Phones,

    /// Transfers to private persons
    Transfers,

    /// Spending reports over the last three months
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Spending in one category
    Category {
        category: String,

        /// Optional anchor date, "YYYY-MM-DD" (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Write the report JSON into this directory as well
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Average spending per weekday
    Weekday {
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Average spending on workdays versus weekends
    Workday {
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if !cli.csv.exists() {
        bail!("statement not found: {} (pass --csv <path>)", cli.csv.display());
    }
    let records = parse_statement_csv(&cli.csv)
        .with_context(|| format!("parsing {}", cli.csv.display()))?;

    match cli.command {
        Command::Dashboard { date } => {
            let anchor = parse_anchor(&date)?;
            let market = fetch_market(&cli.settings, anchor.date()).await;
            println!(
                "{}",
                main_dashboard(&records, anchor, Local::now().naive_local(), &market)
            );
        }

        Command::Events { date, period } => {
            let anchor = parse_anchor(&date)?;
            let period = parse_period(&period)?;
            let market = fetch_market(&cli.settings, anchor.date()).await;
            println!("{}", events_dashboard(&records, anchor, period, &market));
        }

        Command::Cashback { year, month, percent } => {
            if !(1..=12).contains(&month) {
                bail!("month must be 1..=12, got {month}");
            }
            println!("{}", beneficial_cashback_categories(&records, year, month, percent));
        }

        Command::Invest { month, limit } => {
            if !ROUND_UP_LIMITS.contains(&limit) {
                bail!("limit must be one of {ROUND_UP_LIMITS:?}, got {limit}");
            }
            let total = investment_roundup(&records, &month, limit)?;
            println!("{total:.2}");
        }

        Command::Search { keyword } => {
            println!("{}", keyword_search_json(&records, &keyword));
        }

        Command::Phones => {
            println!("{}", phone_search_json(&records));
        }

        Command::Transfers => {
            println!("{}", person_transfers_json(&records));
        }

        Command::Report { command } => {
            run_report(command, &records)?;
        }
    }

    Ok(())
}

fn run_report(command: ReportCommand, records: &[Transaction]) -> Result<()> {
    let (stem, out, buckets) = match command {
        ReportCommand::Category { category, date, out } => {
            let anchor = parse_report_date(date.as_deref())?;
            let buckets = spending_by_category(records, &category, anchor);
            ("spending_by_category", out, buckets)
        }
        ReportCommand::Weekday { date, out } => {
            let anchor = parse_report_date(date.as_deref())?;
            ("spending_by_weekday", out, spending_by_weekday(records, anchor))
        }
        ReportCommand::Workday { date, out } => {
            let anchor = parse_report_date(date.as_deref())?;
            ("spending_by_workday", out, spending_by_workday(records, anchor))
        }
    };

    let mut payload = serde_json::Map::new();
    for bucket in buckets {
        payload.insert(bucket.key, round2(bucket.total).into());
    }
    let payload: serde_json::Value = payload.into();

    println!("{}", serde_json::to_string_pretty(&payload)?);
    if let Some(dir) = out {
        let path = save_report(dir, stem, &payload)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Fetch market data for the dashboards; every failure degrades to an empty
/// block so the report still renders.
async fn fetch_market(settings_path: &std::path::Path, on_date: NaiveDate) -> MarketData {
    let settings = match load_settings(settings_path) {
        Ok(settings) => settings,
        Err(error) => {
            warn!(%error, "no usable user settings, skipping market data");
            UserSettings::default()
        }
    };

    let client = reqwest::Client::new();
    let currency_rates = match std::env::var("API_KEY_EXCHANGE") {
        Ok(key) => fetch_currency_rates(&client, on_date, &settings.user_currencies, &key)
            .await
            .unwrap_or_else(|error| {
                warn!(%error, "currency rates unavailable");
                HashMap::new()
            }),
        Err(_) => {
            if !settings.user_currencies.is_empty() {
                warn!("API_KEY_EXCHANGE not set, skipping currency rates");
            }
            HashMap::new()
        }
    };
    let stock_prices = match std::env::var("API_KEY_STOCK") {
        Ok(key) => fetch_stock_prices(&client, on_date, &settings.user_stocks, &key)
            .await
            .unwrap_or_else(|error| {
                warn!(%error, "stock prices unavailable");
                HashMap::new()
            }),
        Err(_) => {
            if !settings.user_stocks.is_empty() {
                warn!("API_KEY_STOCK not set, skipping stock prices");
            }
            HashMap::new()
        }
    };

    MarketData {
        currency_rates,
        stock_prices,
    }
}

fn parse_anchor(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, ANCHOR_FORMAT)
        .with_context(|| format!("invalid date `{raw}`, expected {ANCHOR_FORMAT}"))
}

fn parse_report_date(raw: Option<&str>) -> Result<Option<NaiveDateTime>> {
    let Some(raw) = raw else { return Ok(None) };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date `{raw}`, expected YYYY-MM-DD"))?;
    Ok(date.and_hms_opt(0, 0, 0))
}

/// Period codes are validated here so the resolver's degenerate fallback is
/// never reached from the CLI.
fn parse_period(raw: &str) -> Result<Period> {
    let code = raw.trim().to_ascii_uppercase();
    if !matches!(code.as_str(), "W" | "M" | "Y" | "ALL") {
        bail!("period must be W, M, Y or ALL, got `{raw}`");
    }
    Ok(Period::from_code(&code))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
