//! User settings: which currencies and stock tickers the dashboards track.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Contents of `user_settings.json` next to the statement export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub user_currencies: Vec<String>,
    #[serde(default)]
    pub user_stocks: Vec<String>,
}

pub fn load_settings(path: impl AsRef<Path>) -> Result<UserSettings> {
    let raw = fs::read_to_string(path.as_ref())
        .with_context(|| format!("reading {}", path.as_ref().display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.as_ref().display()))
}
