//! Target-proximity pool.
//!
//! Every wager shares the pool in proportion to how close its guess was:
//!
//!   error_i            = |guess_i - target|
//!   proximity_i        = exp(-error_i / s)
//!   effective_weight_i = amount_i * proximity_i
//!   payoff_i           = (1 - fee_i) * effective_weight_i * M / W
//!
//! with M = sum(amount) and W = sum(effective_weight). If M <= 0 or W <= 0
//! every payoff is 0. Proximity underflowing to 0 for far guesses is expected.

use tracing::{debug, warn};

use super::{Distribution, PayoutRule};
use crate::types::{
    MarketVariant, Outcome, PoolStatus, ProximityDetail, SettlementResult, ValidationError, Wager,
};

/// Relative slack (per unit staked) under which a negative pnl counts as
/// break-even. Covers rounding in `ew * M / W`.
const BREAK_EVEN_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ProximityPool {
    decay_scale: f64,
}

impl ProximityPool {
    /// Build a pool with decay scale `s`. Rejects s <= 0.
    pub fn new(decay_scale: f64) -> Result<Self, ValidationError> {
        if decay_scale.is_finite() && decay_scale > 0.0 {
            Ok(Self { decay_scale })
        } else {
            Err(ValidationError::InvalidScaleParameter { scale: decay_scale })
        }
    }

    pub fn decay_scale(&self) -> f64 {
        self.decay_scale
    }

    /// Closeness score in (0, 1] (or exactly 0 after underflow).
    pub fn proximity(&self, guess: f64, target: f64) -> ProximityDetail {
        let error = (guess - target).abs();
        let proximity = (-error / self.decay_scale).exp();
        ProximityDetail {
            error,
            proximity,
            effective_weight: 0.0,
        }
    }

    fn resolve_target(&self, outcome: &Outcome) -> Result<f64, ValidationError> {
        let target = match outcome {
            Outcome::Target(t) => Some(*t),
            Outcome::Label(label) => label.trim().parse::<f64>().ok(),
        };
        match target {
            Some(t) if t.is_finite() => Ok(t),
            _ => Err(ValidationError::InvalidOutcome {
                variant: MarketVariant::TargetProximity,
                outcome: outcome.to_string(),
            }),
        }
    }
}

impl PayoutRule for ProximityPool {
    fn variant(&self) -> MarketVariant {
        MarketVariant::TargetProximity
    }

    fn distribute(
        &self,
        wagers: &[Wager],
        outcome: &Outcome,
    ) -> Result<Distribution, ValidationError> {
        let target = self.resolve_target(outcome)?;

        let details: Vec<ProximityDetail> = wagers
            .iter()
            .map(|w| {
                // Validated wagers always carry a guess; treat anything else as infinitely far.
                let guess = w.selection.as_guess().unwrap_or(f64::INFINITY);
                let mut detail = self.proximity(guess, target);
                detail.effective_weight = w.amount * detail.proximity;
                detail
            })
            .collect();

        let total_pool: f64 = wagers.iter().map(|w| w.amount).sum();
        let total_weight: f64 = details.iter().map(|d| d.effective_weight).sum();

        let status = if total_pool <= 0.0 {
            PoolStatus::EmptyPool
        } else if total_weight <= 0.0 {
            PoolStatus::NoWinningStake
        } else {
            PoolStatus::Distributed
        };

        if status == PoolStatus::NoWinningStake {
            warn!(
                outcome = target,
                total_pool,
                decay_scale = self.decay_scale,
                "Every proximity weight vanished; house retains the pool"
            );
        }

        let scale = if status == PoolStatus::Distributed {
            total_pool / total_weight
        } else {
            0.0
        };

        let results = wagers
            .iter()
            .zip(details)
            .map(|(w, detail)| {
                let payoff = (1.0 - w.fee_rate) * detail.effective_weight * scale;
                let pnl = payoff - w.amount;
                debug!(
                    bettor = %w.bettor_id,
                    guess = %w.selection,
                    error = detail.error,
                    proximity = detail.proximity,
                    payoff,
                    "Wager settled"
                );
                SettlementResult::new(&w.bettor_id, w.amount, payoff, is_win(w.amount, pnl))
                    .with_proximity(detail)
            })
            .collect();

        Ok(Distribution {
            outcome: Outcome::Target(target),
            total_pool,
            winning_pool: total_weight,
            status,
            results,
        })
    }
}

/// Break-even counts as a win; zero stakes never do.
fn is_win(amount: f64, pnl: f64) -> bool {
    amount > 0.0 && pnl >= -BREAK_EVEN_TOLERANCE * amount.max(1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
