//! moneta-reports: report assembly on top of the core engine.
//!
//! Views and services compose the pure core operations into named JSON
//! payloads; the rates module talks to the exchange/stock APIs so the views
//! themselves never perform I/O.

pub mod persist;
pub mod rates;
pub mod services;
pub mod settings;
pub mod spending;
pub mod views;

pub use settings::UserSettings;
pub use views::MarketData;
