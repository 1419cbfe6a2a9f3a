//! Settlement engine: validate → distribute → post to ledger.

pub mod accountant;
pub mod parimutuel;
pub mod proximity;
pub mod validator;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::ledger::PlayerLedger;
use crate::types::{
    Market, MarketVariant, Outcome, PoolStatus, SettlementError, SettlementReport,
    SettlementResult, ValidationError, Wager,
};
use accountant::Accountant;
use parimutuel::ParimutuelPool;
use proximity::ProximityPool;
use validator::{InputValidator, RawMarket};

// ---------------------------------------------------------------------------
// Payout rule
// ---------------------------------------------------------------------------

/// Raw output of a payout rule, before it is wrapped into a report.
#[derive(Debug, Clone)]
pub struct Distribution {
    /// Outcome after normalization (lower-cased label, parsed target, ...).
    pub outcome: Outcome,
    pub total_pool: f64,
    /// Mwin (discrete) or W (proximity).
    pub winning_pool: f64,
    pub status: PoolStatus,
    pub results: Vec<SettlementResult>,
}

/// How one market variant redistributes its pool.
///
/// Implementations only do math: they never touch the ledger and reject a
/// bad outcome before computing anything.
pub trait PayoutRule {
    fn variant(&self) -> MarketVariant;

    fn distribute(
        &self,
        wagers: &[Wager],
        outcome: &Outcome,
    ) -> Result<Distribution, ValidationError>;
}

/// Pick the payout rule for a validated market.
pub fn rule_for(market: &Market) -> Result<Box<dyn PayoutRule>, ValidationError> {
    let rule: Box<dyn PayoutRule> = match market.variant {
        MarketVariant::Binary => Box::new(ParimutuelPool::binary()),
        MarketVariant::MultiOption => Box::new(ParimutuelPool::multi_option(market.trim_labels)),
        MarketVariant::TargetProximity => {
            let scale = market
                .decay_scale
                .ok_or(ValidationError::MissingField {
                    field: "decay_scale",
                    bettor_id: None,
                })?;
            Box::new(ProximityPool::new(scale)?)
        }
    };
    Ok(rule)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Entry point for settling markets.
///
/// `settle` is pure. `settle_into` also posts the results to a ledger and
/// recomputes titles; the ledger is borrowed mutably for the whole call, so
/// two settlements can never interleave on the same ledger.
pub struct SettlementEngine {
    validator: InputValidator,
}

impl SettlementEngine {
    pub fn new(validator: InputValidator) -> Self {
        Self { validator }
    }

    /// Compute payoffs for a validated market.
    pub fn settle(market: &Market, outcome: &Outcome) -> Result<SettlementReport, ValidationError> {
        let rule = rule_for(market)?;
        let dist = rule.distribute(&market.wagers, outcome)?;
        let total_payoff: f64 = dist.results.iter().map(|r| r.payoff).sum();

        let report = SettlementReport {
            id: Uuid::new_v4(),
            market_id: market.id.clone(),
            variant: market.variant,
            outcome: dist.outcome,
            total_pool: dist.total_pool,
            winning_pool: dist.winning_pool,
            total_payoff,
            status: dist.status,
            settled_at: Utc::now(),
            results: dist.results,
        };

        info!(
            market_id = %report.market_id,
            variant = %report.variant,
            outcome = %report.outcome,
            pool = format!("${:.2}", report.total_pool),
            paid = format!("${:.2}", report.total_payoff),
            house = format!("${:.2}", report.house_take()),
            winners = report.winners(),
            status = %report.status,
            "Market settled"
        );

        Ok(report)
    }

    /// Settle a validated market and post every result to the ledger as one
    /// unit. On error the ledger is left exactly as it was.
    pub fn settle_into(
        market: &Market,
        outcome: &Outcome,
        ledger: &mut PlayerLedger,
    ) -> Result<SettlementReport, SettlementError> {
        let report = Self::settle(market, outcome)?;
        Accountant::post(ledger, market, &report)?;
        Ok(report)
    }

    /// Validate raw input, then settle it. Nothing is computed if validation
    /// fails.
    pub fn settle_raw(
        &self,
        raw: &RawMarket,
        outcome: &Outcome,
    ) -> Result<SettlementReport, SettlementError> {
        let market = self.validator.validate(raw)?;
        Ok(Self::settle(&market, outcome)?)
    }

    /// Validate, settle and post to the ledger.
    pub fn settle_raw_into(
        &self,
        raw: &RawMarket,
        outcome: &Outcome,
        ledger: &mut PlayerLedger,
    ) -> Result<SettlementReport, SettlementError> {
        let market = self.validator.validate(raw)?;
        Self::settle_into(&market, outcome, ledger)
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(InputValidator::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
