//! Player ledger.
//!
//! Running statistics per player, created lazily on first reference. Stats
//! only change through `PlayerStats::apply_bet_result`; a whole settlement is
//! committed at once through `PlayerLedger::apply_batch`, which stages every
//! update on copies and only swaps them in when all of them succeeded.

pub mod titles;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::types::LedgerError;
use titles::TitleBoard;

// ---------------------------------------------------------------------------
// Player stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub id: String,
    pub display_name: String,
    pub total_wins: u32,
    pub total_losses: u32,
    pub cumulative_pnl: f64,
    /// Best single-bet pnl, never below 0.
    pub greatest_win: f64,
    /// Worst single-bet pnl, never above 0.
    pub greatest_loss: f64,
    pub win_streak: u32,
    pub bet_count: u32,
}

impl PlayerStats {
    /// Fresh player. Without a (non-blank) display name the id is used.
    pub fn new(id: &str, display_name: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(id)
                .to_string(),
            total_wins: 0,
            total_losses: 0,
            cumulative_pnl: 0.0,
            greatest_win: 0.0,
            greatest_loss: 0.0,
            win_streak: 0,
            bet_count: 0,
        }
    }

    /// Record one settled bet. Zero-stake bets are ignored entirely.
    pub fn apply_bet_result(&mut self, amount: f64, pnl: f64, did_win: bool) {
        if amount <= 0.0 {
            return;
        }

        self.bet_count += 1;
        self.cumulative_pnl += pnl;

        if pnl > self.greatest_win {
            self.greatest_win = pnl;
        }
        if pnl < self.greatest_loss {
            self.greatest_loss = pnl;
        }

        if did_win {
            self.total_wins += 1;
            self.win_streak += 1;
        } else {
            self.total_losses += 1;
            self.win_streak = 0;
        }
    }

    /// Replace a placeholder name (the id) with a real one.
    pub fn adopt_display_name(&mut self, display_name: Option<&str>) {
        if let Some(name) = display_name {
            if self.display_name == self.id && !name.trim().is_empty() {
                self.display_name = name.to_string();
            }
        }
    }

    /// Win rate as a percentage. Returns 0.0 with no resolved bets.
    pub fn win_rate(&self) -> f64 {
        let resolved = self.total_wins + self.total_losses;
        if resolved == 0 {
            0.0
        } else {
            (self.total_wins as f64 / resolved as f64) * 100.0
        }
    }
}

impl fmt::Display for PlayerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | wins={} losses={} | PnL={:.2} | greatest_win={:.2} greatest_loss={:.2} | streak={} | bets={}",
            self.display_name,
            self.total_wins,
            self.total_losses,
            self.cumulative_pnl,
            self.greatest_win,
            self.greatest_loss,
            self.win_streak,
            self.bet_count,
        )
    }
}

// ---------------------------------------------------------------------------
// Batch entries
// ---------------------------------------------------------------------------

/// One bet outcome destined for the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct BetEntry {
    pub player_id: String,
    pub display_name: Option<String>,
    pub amount: f64,
    pub pnl: f64,
    pub did_win: bool,
}

/// What a committed batch did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub players_created: usize,
    pub players_updated: usize,
    pub bets_recorded: usize,
    pub bets_ignored: usize,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// All known players plus the titles derived from them.
///
/// Players keep insertion order, which is also the order of title holders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerLedger {
    players: Vec<PlayerStats>,
    #[serde(skip)]
    titles: TitleBoard,
}

impl PlayerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored players.
    pub fn from_players(players: Vec<PlayerStats>) -> Self {
        let mut ledger = Self {
            players,
            titles: TitleBoard::default(),
        };
        ledger.recompute_titles();
        ledger
    }

    pub fn players(&self) -> &[PlayerStats] {
        &self.players
    }

    pub fn titles(&self) -> &TitleBoard {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PlayerStats> {
        self.players.iter().find(|p| p.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Look up a player, creating it on first reference. Creating a player
    /// recomputes titles; adopting a display name does not change them.
    pub fn get_or_create_player(
        &mut self,
        id: &str,
        display_name: Option<&str>,
    ) -> &mut PlayerStats {
        let idx = match self.position(id) {
            Some(idx) => {
                self.players[idx].adopt_display_name(display_name);
                idx
            }
            None => {
                self.players.push(PlayerStats::new(id, display_name));
                self.recompute_titles();
                self.players.len() - 1
            }
        };
        &mut self.players[idx]
    }

    /// Full recomputation of every title from the current players.
    pub fn recompute_titles(&mut self) {
        self.titles = TitleBoard::recompute(&self.players);
    }

    /// Apply every entry of one settlement, then recompute titles once.
    ///
    /// Either every entry is applied or none is: updates run against staged
    /// copies and the ledger is only touched after the last one succeeded.
    pub fn apply_batch(&mut self, entries: &[BetEntry]) -> Result<BatchSummary, LedgerError> {
        let mut staged: Vec<PlayerStats> = Vec::new();
        let mut staged_index: HashMap<String, usize> = HashMap::new();
        let mut summary = BatchSummary::default();

        for entry in entries {
            if entry.player_id.trim().is_empty() {
                return Err(LedgerError::EmptyPlayerId);
            }
            check_finite(&entry.player_id, "amount", entry.amount)?;
            check_finite(&entry.player_id, "pnl", entry.pnl)?;

            let slot = match staged_index.get(&entry.player_id).copied() {
                Some(slot) => slot,
                None => {
                    let stats = match self.get(&entry.player_id) {
                        Some(existing) => existing.clone(),
                        None => {
                            summary.players_created += 1;
                            PlayerStats::new(&entry.player_id, entry.display_name.as_deref())
                        }
                    };
                    staged.push(stats);
                    staged_index.insert(entry.player_id.clone(), staged.len() - 1);
                    staged.len() - 1
                }
            };

            let stats = &mut staged[slot];
            stats.adopt_display_name(entry.display_name.as_deref());
            if entry.amount > 0.0 {
                summary.bets_recorded += 1;
            } else {
                summary.bets_ignored += 1;
            }
            stats.apply_bet_result(entry.amount, entry.pnl, entry.did_win);

            if !stats.cumulative_pnl.is_finite() {
                return Err(LedgerError::NonFiniteValue {
                    player_id: entry.player_id.clone(),
                    field: "cumulative_pnl",
                    value: stats.cumulative_pnl,
                });
            }
        }

        // Commit.
        for stats in staged {
            match self.position(&stats.id) {
                Some(idx) => {
                    summary.players_updated += 1;
                    self.players[idx] = stats;
                }
                None => self.players.push(stats),
            }
        }
        self.recompute_titles();

        debug!(
            created = summary.players_created,
            updated = summary.players_updated,
            bets = summary.bets_recorded,
            ignored = summary.bets_ignored,
            "Ledger batch committed"
        );

        Ok(summary)
    }
}

fn check_finite(player_id: &str, field: &'static str, value: f64) -> Result<(), LedgerError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LedgerError::NonFiniteValue {
            player_id: player_id.to_string(),
            field,
            value,
        })
    }
}

impl fmt::Display for PlayerLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for player in &self.players {
            writeln!(f, "{player}")?;
        }
        write!(f, "{}", self.titles)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
