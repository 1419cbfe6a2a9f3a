//! Command-line interface definitions and command handlers.
//!
//! Handlers take the ledger store as a trait object so they can be driven
//! by a mock in tests; `main` wires them to a `JsonFileStore`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::engine::validator::RawMarket;
use crate::engine::SettlementEngine;
use crate::ledger::PlayerLedger;
use crate::storage::LedgerStore;
use crate::types::{Outcome, SettlementReport};

/// Wagerbook - settle closed wagering markets and track player standings.
#[derive(Parser, Debug)]
#[command(name = "wagerbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Settle a closed market against a resolved outcome
    Settle(SettleArgs),

    /// Show player statistics and titles
    Standings(LedgerArg),
}

#[derive(Args, Debug)]
pub struct SettleArgs {
    /// JSON file describing the market and its wagers
    #[arg(long)]
    pub market: PathBuf,

    /// Resolved outcome: option label, or numeric target for proximity markets
    #[arg(long)]
    pub outcome: String,

    /// Compute payouts and stats without saving the ledger
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub ledger: LedgerArg,
}

/// Shared argument for commands that touch the ledger file.
#[derive(Args, Debug)]
pub struct LedgerArg {
    /// Ledger file (overrides storage.ledger_path)
    #[arg(long = "ledger")]
    pub path: Option<PathBuf>,
}

/// Read a raw market from a JSON file.
pub fn read_market(path: &Path) -> Result<RawMarket> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read market file: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse market file: {}", path.display()))
}

/// Restore the ledger, settle the market into it, and save it back unless
/// this is a dry run. Nothing is saved when settlement fails.
pub fn run_settle(
    engine: &SettlementEngine,
    store: &dyn LedgerStore,
    raw: &RawMarket,
    outcome: &str,
    dry_run: bool,
) -> Result<(SettlementReport, PlayerLedger)> {
    let mut ledger = store.load()?.unwrap_or_default();
    let outcome = Outcome::parse_for(raw.variant, outcome);

    let report = engine
        .settle_raw_into(raw, &outcome, &mut ledger)
        .context("Settlement failed")?;

    if dry_run {
        info!(market_id = %report.market_id, "Dry run: ledger not saved");
    } else {
        store.save(&ledger)?;
    }

    Ok((report, ledger))
}

/// Load the current standings (empty ledger when nothing was saved yet).
pub fn run_standings(store: &dyn LedgerStore) -> Result<PlayerLedger> {
    Ok(store.load()?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
