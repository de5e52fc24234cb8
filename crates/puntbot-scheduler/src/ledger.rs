//! Sent-ledger — the durable set of delivered event identifiers.
//!
//! On disk: a JSON array of identifier strings. Loaded once at startup,
//! consulted during registration and again just before delivery, updated
//! after each successful delivery. Writes go through a temp file, fsync, and
//! rename so a crash mid-write never loses previously recorded entries.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use puntbot_core::config::LedgerScope;
use puntbot_core::error::{PuntBotError, Result};
use puntbot_core::types::EventId;

pub struct SentLedger {
    path: PathBuf,
    ids: HashSet<String>,
}

impl SentLedger {
    /// Open the ledger at `path`, creating parent directories as needed. A
    /// missing file is an empty ledger; an unparseable one is an error rather
    /// than silent data loss.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let ids = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let list: Vec<String> = serde_json::from_str(&content).map_err(|e| {
                PuntBotError::ledger(format!("corrupt ledger {}: {e}", path.display()))
            })?;
            list.into_iter().collect()
        } else {
            HashSet::new()
        };
        tracing::info!("Loaded {} sent ids from {}", ids.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            ids,
        })
    }

    /// Open with a dedup scope: `Daily` stamps the file name with the given
    /// calendar date so identifiers may recur on later days.
    pub fn open_scoped(path: &Path, scope: LedgerScope, today: NaiveDate) -> Result<Self> {
        let path = match scope {
            LedgerScope::All => path.to_path_buf(),
            LedgerScope::Daily => {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("sent");
                let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("json");
                path.with_file_name(format!("{stem}-{}.{ext}", today.format("%Y-%m-%d")))
            }
        };
        Self::open(&path)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.ids.contains(id.as_str())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Record a delivered identifier. Idempotent; durable before return.
    pub fn record(&mut self, id: &EventId) -> Result<()> {
        if !self.ids.insert(id.as_str().to_string()) {
            return Ok(());
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let mut list: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        list.sort_unstable();
        let json = serde_json::to_string_pretty(&list)?;

        let tmp = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
