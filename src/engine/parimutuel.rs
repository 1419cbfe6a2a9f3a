//! Parimutuel pool for discrete markets (Binary and MultiOption).
//!
//! payoff_i = amount_i * (1 - fee_i) * M / Mwin for winners, 0 for losers,
//! where M is the whole pool and Mwin the stake on the resolved label.
//! When M = 0 or Mwin = 0 every payoff is 0 and the house keeps the pool.

use tracing::{debug, warn};

use super::{Distribution, PayoutRule};
use crate::types::{
    MarketVariant, Outcome, PoolStatus, SettlementResult, ValidationError, Wager,
};

/// Label-matching pool shared by Binary and MultiOption markets.
#[derive(Debug, Clone)]
pub struct ParimutuelPool {
    variant: MarketVariant,
    trim_labels: bool,
}

impl ParimutuelPool {
    pub fn binary() -> Self {
        Self {
            variant: MarketVariant::Binary,
            trim_labels: true,
        }
    }

    pub fn multi_option(trim_labels: bool) -> Self {
        Self {
            variant: MarketVariant::MultiOption,
            trim_labels,
        }
    }

    /// Normalize the resolved outcome the same way wager selections were.
    pub fn resolve_label(&self, outcome: &Outcome) -> Result<String, ValidationError> {
        let raw = match outcome {
            Outcome::Label(label) => label.clone(),
            Outcome::Target(t) if t.is_finite() && self.variant == MarketVariant::MultiOption => {
                t.to_string()
            }
            other => return Err(self.invalid(other.to_string())),
        };

        match self.variant {
            MarketVariant::Binary => {
                let label = raw.trim().to_lowercase();
                if label == "yes" || label == "no" {
                    Ok(label)
                } else {
                    Err(self.invalid(raw))
                }
            }
            _ => {
                let label = if self.trim_labels { raw.trim().to_string() } else { raw.clone() };
                if label.trim().is_empty() {
                    Err(self.invalid(raw))
                } else {
                    Ok(label)
                }
            }
        }
    }

    fn invalid(&self, outcome: String) -> ValidationError {
        ValidationError::InvalidOutcome {
            variant: self.variant,
            outcome,
        }
    }
}

impl PayoutRule for ParimutuelPool {
    fn variant(&self) -> MarketVariant {
        self.variant
    }

    fn distribute(
        &self,
        wagers: &[Wager],
        outcome: &Outcome,
    ) -> Result<Distribution, ValidationError> {
        let label = self.resolve_label(outcome)?;
        let is_winner = |w: &Wager| w.selection.as_label() == Some(label.as_str());

        let total_pool: f64 = wagers.iter().map(|w| w.amount).sum();
        let winning_pool: f64 = wagers.iter().filter(|&w| is_winner(w)).map(|w| w.amount).sum();

        let status = if total_pool <= 0.0 {
            PoolStatus::EmptyPool
        } else if winning_pool <= 0.0 {
            PoolStatus::NoWinningStake
        } else {
            PoolStatus::Distributed
        };

        if status == PoolStatus::NoWinningStake {
            warn!(
                outcome = %label,
                total_pool,
                "Nobody staked on the resolved outcome; house retains the pool"
            );
        }

        let multiplier = if status == PoolStatus::Distributed {
            total_pool / winning_pool
        } else {
            0.0
        };

        let results = wagers
            .iter()
            .map(|w| {
                let won = is_winner(w);
                let payoff = if won {
                    w.amount * (1.0 - w.fee_rate) * multiplier
                } else {
                    0.0
                };
                debug!(
                    bettor = %w.bettor_id,
                    selection = %w.selection,
                    amount = w.amount,
                    payoff,
                    "Wager settled"
                );
                SettlementResult::new(&w.bettor_id, w.amount, payoff, won && w.amount > 0.0)
            })
            .collect();

        Ok(Distribution {
            outcome: Outcome::Label(label),
            total_pool,
            winning_pool,
            status,
            results,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
