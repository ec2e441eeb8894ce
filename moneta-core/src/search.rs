//! Keyword and pattern search over transaction text fields.
//!
//! All matching is case-insensitive. A record matches when ANY of the given
//! fields matches; results keep the source order.

use anyhow::{Context, Result};
use regex::RegexBuilder;
use tracing::debug;

use crate::transaction::{SearchField, TRANSFERS_CATEGORY, Transaction};

/// Phone-number shape found in top-up descriptions: `+7 XXX XXX-XX-XX`.
pub const PHONE_PATTERN: &str = r"\+7\s\d{3}\s\d{3}-\d{2}-\d{2}";

/// Person-to-person transfer signature: a capitalized first name followed by
/// a capitalized initial and a period ("Sergey Z."). Compiled through the
/// same case-insensitive matcher as every other pattern, as the source
/// system does.
pub const PERSON_TRANSFER_PATTERN: &str = r"\p{Lu}\p{Ll}+\s\p{Lu}\.";

/// Keep records where any of `fields` matches `query`. With `literal` the
/// query is escaped first, giving substring semantics with special
/// characters treated verbatim; otherwise it is compiled as a regex.
pub fn search(
    records: &[Transaction],
    query: &str,
    fields: &[SearchField],
    literal: bool,
) -> Result<Vec<Transaction>> {
    let pattern = if literal {
        regex::escape(query)
    } else {
        query.to_string()
    };
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("compiling search pattern `{query}`"))?;

    let matches: Vec<Transaction> = records
        .iter()
        .filter(|tx| fields.iter().any(|field| re.is_match(field.value(tx))))
        .cloned()
        .collect();
    debug!(matched = matches.len(), literal, "search over {} records", records.len());
    Ok(matches)
}

/// Free-text keyword search over description and category.
pub fn search_keyword(records: &[Transaction], keyword: &str) -> Result<Vec<Transaction>> {
    search(
        records,
        keyword,
        &[SearchField::Description, SearchField::Category],
        true,
    )
}

/// Records whose description carries a mobile phone number.
pub fn search_phone(records: &[Transaction]) -> Result<Vec<Transaction>> {
    search(records, PHONE_PATTERN, &[SearchField::Description], false)
}

/// Transfers to private persons: category restricted to transfers, then the
/// name-plus-initial signature matched against the description.
pub fn search_person_transfers(records: &[Transaction]) -> Result<Vec<Transaction>> {
    let transfers: Vec<Transaction> = records
        .iter()
        .filter(|tx| tx.category == TRANSFERS_CATEGORY)
        .cloned()
        .collect();
    search(
        &transfers,
        PERSON_TRANSFER_PATTERN,
        &[SearchField::Description],
        false,
    )
}
