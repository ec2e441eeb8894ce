//! Report persistence, composed explicitly by the caller after the pure
//! computation; nothing in the views or services writes to disk on its own.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

/// Write a report payload as pretty-printed JSON under `dir`, returning the
/// file path.
pub fn save_report(dir: impl AsRef<Path>, stem: &str, payload: &Value) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let path = dir.join(format!("{stem}.json"));
    let rendered = serde_json::to_string_pretty(payload).context("serializing report")?;
    fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "saved report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_report_round_trip() {
        let dir = std::env::temp_dir().join("moneta-report-tests");
        let payload = json!({ "Beauty": 337.0 });
        let path = save_report(&dir, "spending_by_category", &payload).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let loaded: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded, payload);
        fs::remove_file(path).unwrap();
    }
}
