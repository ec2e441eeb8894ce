//! moneta-core: transaction aggregation and reporting engine.
//!
//! Pure, synchronous, in-memory. Statement I/O, network lookups, and view
//! rendering live in the sibling crates; this one only turns record sets
//! into derived values.

pub mod aggregate;
pub mod cashback;
pub mod filter;
pub mod search;
pub mod transaction;
pub mod window;

pub use aggregate::{
    Bucket, CardBucket, OTHER_BUCKET, averages_by, card_totals, top_transactions, total_amount,
    totals_by, totals_by_category,
};
pub use cashback::{cashback_by_category, projected_cashback, round_up_delta, round_up_total};
pub use filter::{FilterOptions, filter_spending, in_window, with_categories};
pub use search::{
    PERSON_TRANSFER_PATTERN, PHONE_PATTERN, search, search_keyword, search_person_transfers,
    search_phone,
};
pub use transaction::{
    CASH_CATEGORY, STATEMENT_DATE_FORMAT, SearchField, Status, TRANSFERS_CATEGORY, Transaction,
    last_digits,
};
pub use window::{DateWindow, Period, resolve};
