//! moneta-ingest: statement-export ingestion (CSV) into typed transactions.

pub mod statement;

pub use statement::{parse_statement_csv, parse_statement_reader};
