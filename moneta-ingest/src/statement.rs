//! Parse bank statement CSV exports into typed transactions.
//!
//! Exports carry a preamble before the header row in some bank versions, so
//! the parser scans for the header instead of assuming row zero:
//! Transaction date,Card number,Status,Amount,Rounded amount,
//! Bonuses (including cashback),Category,Description

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use csv::StringRecord;
use tracing::{debug, info};

use moneta_core::{STATEMENT_DATE_FORMAT, Status, Transaction};

const DATE_COLUMN: &str = "Transaction date";
const CARD_COLUMN: &str = "Card number";
const STATUS_COLUMN: &str = "Status";
const AMOUNT_COLUMN: &str = "Amount";
const ROUNDED_COLUMN: &str = "Rounded amount";
const BONUSES_COLUMN: &str = "Bonuses (including cashback)";
const CATEGORY_COLUMN: &str = "Category";
const DESCRIPTION_COLUMN: &str = "Description";

struct Columns {
    date: usize,
    card: Option<usize>,
    status: Option<usize>,
    amount: Option<usize>,
    rounded: Option<usize>,
    bonuses: Option<usize>,
    category: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Option<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(name))
        };
        Some(Self {
            date: find(DATE_COLUMN)?,
            card: find(CARD_COLUMN),
            status: find(STATUS_COLUMN),
            amount: find(AMOUNT_COLUMN),
            rounded: find(ROUNDED_COLUMN),
            bonuses: find(BONUSES_COLUMN),
            category: find(CATEGORY_COLUMN),
            description: find(DESCRIPTION_COLUMN),
        })
    }
}

/// Parse a statement CSV file, returning all rows with a valid date.
/// Rows that fail to parse are skipped, not errors; statement exports are
/// dirty and aggregation is best-effort.
pub fn parse_statement_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    let txns = parse_statement_reader(file)?;
    info!(
        transactions = txns.len(),
        path = %path.as_ref().display(),
        "parsed statement export"
    );
    Ok(txns)
}

/// Parse statement CSV data from any reader.
pub fn parse_statement_reader<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut columns: Option<Columns> = None;
    let mut txns = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = result?;

        // Scan past any preamble until the header row.
        let Some(cols) = &columns else {
            columns = Columns::from_header(&record);
            continue;
        };

        let date_str = record.get(cols.date).unwrap_or("").trim();
        if date_str.is_empty() {
            continue;
        }
        let occurred_at = match NaiveDateTime::parse_from_str(date_str, STATEMENT_DATE_FORMAT) {
            Ok(dt) => dt,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("").trim();

        let amount = parse_number(cell(cols.amount));
        // The export carries the rounded amount as a magnitude; re-sign it
        // so both amount fields share sign class.
        let amount_rounded = match (parse_number(cell(cols.rounded)), amount) {
            (Some(rounded), Some(amount)) => Some(rounded.copysign(amount)),
            (rounded, _) => rounded,
        };

        let card = cell(cols.card);
        txns.push(Transaction {
            occurred_at,
            card_number: (!card.is_empty()).then(|| card.to_string()),
            status: Status::from_code(cell(cols.status)),
            amount,
            amount_rounded,
            cashback_bonus: parse_number(cell(cols.bonuses)).unwrap_or(0.0),
            category: cell(cols.category).to_string(),
            description: cell(cols.description).to_string(),
        });
    }

    if columns.is_none() {
        bail!("no statement header row found (expected a `{DATE_COLUMN}` column)");
    }
    if skipped > 0 {
        debug!(skipped, "dropped rows with unparseable dates");
    }
    Ok(txns)
}

fn parse_number(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    cell.replace(',', ".").parse().ok()
}
