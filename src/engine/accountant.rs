//! Accountant: posts settlement results to the player ledger.
//!
//! Turns a report into ledger entries (one per wager, with the
//! variant-specific win flag already decided by the payout rule) and commits
//! them as a single batch followed by one title recomputation.

use tracing::{info, warn};

use crate::ledger::{BatchSummary, BetEntry, PlayerLedger};
use crate::types::{LedgerError, Market, SettlementReport};

pub struct Accountant;

impl Accountant {
    /// Ledger entries for a settled market, in wager order.
    pub fn entries(market: &Market, report: &SettlementReport) -> Vec<BetEntry> {
        report
            .results
            .iter()
            .zip(&market.wagers)
            .map(|(result, wager)| BetEntry {
                player_id: result.bettor_id.clone(),
                display_name: wager.display_name.clone(),
                amount: result.amount,
                pnl: result.pnl,
                did_win: result.did_win,
            })
            .collect()
    }

    /// Commit a settled market to the ledger. On error nothing is applied.
    pub fn post(
        ledger: &mut PlayerLedger,
        market: &Market,
        report: &SettlementReport,
    ) -> Result<BatchSummary, LedgerError> {
        let entries = Self::entries(market, report);

        match ledger.apply_batch(&entries) {
            Ok(summary) => {
                info!(
                    market_id = %report.market_id,
                    created = summary.players_created,
                    updated = summary.players_updated,
                    bets = summary.bets_recorded,
                    ignored = summary.bets_ignored,
                    players = ledger.len(),
                    "Ledger updated"
                );
                Ok(summary)
            }
            Err(e) => {
                warn!(
                    market_id = %report.market_id,
                    error = %e,
                    "Ledger update aborted; no player changed"
                );
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
