//! Statement transaction record and the field types shared across the engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Date format used by the statement export ("31.12.2021 16:44:00").
pub const STATEMENT_DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Category the bank assigns to outgoing transfers. Hard-excluded from
/// cashback projections and the anchor of the person-transfer search.
pub const TRANSFERS_CATEGORY: &str = "Transfers";

/// Category for ATM/cash operations, broken out next to transfers in the
/// events view.
pub const CASH_CATEGORY: &str = "Cash";

/// Processing status reported by the bank. Only `Ok` rows take part in
/// aggregation by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Status {
    /// Map a status cell from the export. Anything unrecognized becomes
    /// `Unknown`, which no default filter matches.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "OK" => Status::Ok,
            "FAILED" => Status::Failed,
            "PENDING" => Status::Pending,
            _ => Status::Unknown,
        }
    }
}

impl From<String> for Status {
    fn from(code: String) -> Self {
        Status::from_code(&code)
    }
}

/// One statement row. Immutable once built; every engine operation returns
/// new collections and never mutates its input.
///
/// `amount` and `amount_rounded` are both signed and share sign class
/// (negative = expense, positive = income/refund). Cashback and round-up
/// math run on `amount_rounded`, not `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub occurred_at: NaiveDateTime,
    /// Full card identifier as exported; only the last four characters are
    /// consumed downstream. `None` when the export leaves the cell blank.
    pub card_number: Option<String>,
    pub status: Status,
    pub amount: Option<f64>,
    /// Amount rounded to the bank's reporting granularity. A distinct field
    /// from `amount`; the divergence is intentional.
    pub amount_rounded: Option<f64>,
    /// Bonus amount the bank already granted, independent of the projected
    /// cashback this engine computes.
    pub cashback_bonus: f64,
    pub category: String,
    pub description: String,
}

impl Transaction {
    /// Returns true if this is an expense (negative amount).
    pub fn is_expense(&self) -> bool {
        self.amount.is_some_and(|a| a < 0.0)
    }

    /// Returns true if this is income or a refund (positive amount).
    pub fn is_income(&self) -> bool {
        self.amount.is_some_and(|a| a > 0.0)
    }

    /// Last four characters of the card identifier, or the whole identifier
    /// when it is shorter than four characters.
    pub fn card_suffix(&self) -> Option<&str> {
        self.card_number.as_deref().map(last_digits)
    }
}

/// Trailing four characters of a card identifier ("*7197" -> "7197").
pub fn last_digits(card: &str) -> &str {
    match card.char_indices().rev().nth(3) {
        Some((idx, _)) => &card[idx..],
        None => card,
    }
}

/// Text fields the pattern search may inspect. Keeps field access typed
/// instead of going through per-call field-name strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Description,
    Category,
}

impl SearchField {
    pub fn value<'t>(&self, tx: &'t Transaction) -> &'t str {
        match self {
            SearchField::Description => &tx.description,
            SearchField::Category => &tx.category,
        }
    }
}
