//! Persistence layer.
//!
//! The settlement core never persists anything itself; callers restore a
//! ledger before settling and save it afterwards. `JsonFileStore` keeps the
//! player list in a single JSON file. Titles are derived data and are
//! recomputed on load instead of being stored.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ledger::{PlayerLedger, PlayerStats};

/// Default ledger file path.
pub const DEFAULT_LEDGER_FILE: &str = "wagerbook_ledger.json";

/// Where a ledger snapshot lives between settlements.
#[cfg_attr(test, mockall::automock)]
pub trait LedgerStore {
    /// Load the ledger. Returns None if nothing was saved yet.
    fn load(&self) -> Result<Option<PlayerLedger>>;

    fn save(&self, ledger: &PlayerLedger) -> Result<()>;
}

/// Ledger snapshot stored as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the snapshot (for testing or reset). Missing file is fine.
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete ledger file {}", self.path.display()))?;
        }
        Ok(())
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_FILE)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Option<PlayerLedger>> {
        let path = self.path.display().to_string();

        if !self.path.exists() {
            info!(path = %path, "No saved ledger found, starting fresh");
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger from {path}"))?;

        let players: Vec<PlayerStats> = serde_json::from_str::<PlayerLedger>(&json)
            .with_context(|| format!("Failed to parse ledger from {path}"))?
            .players()
            .to_vec();
        let ledger = PlayerLedger::from_players(players);

        info!(path = %path, players = ledger.len(), "Ledger loaded from disk");
        Ok(Some(ledger))
    }

    fn save(&self, ledger: &PlayerLedger) -> Result<()> {
        let path = self.path.display().to_string();
        let json = serde_json::to_string_pretty(ledger).context("Failed to serialise ledger")?;

        std::fs::write(&self.path, &json)
            .with_context(|| format!("Failed to write ledger to {path}"))?;

        debug!(path = %path, players = ledger.len(), "Ledger saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
