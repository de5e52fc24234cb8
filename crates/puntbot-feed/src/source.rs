//! Feed acquisition — locating and reading the daily CSV.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use puntbot_core::error::{PuntBotError, Result};

/// One raw feed row before validation. Every column is optional here —
/// the validator decides what survives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedRow {
    #[serde(rename = "Track", default)]
    pub track: Option<String>,
    #[serde(rename = "Race", default)]
    pub race: Option<String>,
    #[serde(rename = "Race Time", default)]
    pub race_time: Option<String>,
    #[serde(rename = "First Selection Name", default)]
    pub selection_name: Option<String>,
    #[serde(rename = "Selection", default)]
    pub selection: Option<String>,
    #[serde(rename = "Units", default)]
    pub units: Option<String>,
    #[serde(rename = "Channel Id", default)]
    pub channel_id: Option<String>,
}

/// Resolve the feed path: an explicit file is used as-is; a directory is
/// searched for today's `YYYY-MM-DD.csv`. A missing file is fatal to the run.
pub fn resolve_feed_path(base: &Path, today: NaiveDate) -> Result<PathBuf> {
    let path = if base.is_file() {
        base.to_path_buf()
    } else {
        base.join(format!("{}.csv", today.format("%Y-%m-%d")))
    };
    if !path.exists() {
        return Err(PuntBotError::feed(format!(
            "feed file not found: {}",
            path.display()
        )));
    }
    Ok(path)
}

/// Read all rows from the feed. Rows that fail CSV deserialization entirely
/// are dropped with a debug log; a file-level read error is fatal.
pub fn read_feed(path: &Path) -> Result<Vec<FeedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PuntBotError::feed(format!("failed to open {}: {e}", path.display())))?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<FeedRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => tracing::debug!("Dropping unreadable feed row: {e}"),
        }
    }
    tracing::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("puntbot-feed-{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resolve_explicit_file() {
        let dir = scratch_dir("explicit");
        let file = dir.join("feed.csv");
        std::fs::write(&file, "Track\n").unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(resolve_feed_path(&file, today).unwrap(), file);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_directory_uses_dated_file() {
        let dir = scratch_dir("dated");
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let dated = dir.join("2026-08-29.csv");
        std::fs::write(&dated, "Track\n").unwrap();
        assert_eq!(resolve_feed_path(&dir, today).unwrap(), dated);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_missing_is_fatal() {
        let dir = scratch_dir("missing");
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert!(resolve_feed_path(&dir, today).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_feed_rows() {
        let dir = scratch_dir("read");
        let file = dir.join("feed.csv");
        std::fs::write(
            &file,
            "Track,Race,Race Time,First Selection Name,Selection,Units,Channel Id\n\
             Flemington,7,14:30,Fast Lad,4,2.0,\n\
             Randwick,2,15:05,Slow Sal,1,1.5,12345\n",
        )
        .unwrap();

        let rows = read_feed(&file).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].track.as_deref(), Some("Flemington"));
        // csv maps an empty field to None for Option columns
        assert_eq!(rows[0].channel_id, None);
        assert_eq!(rows[1].channel_id.as_deref(), Some("12345"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
