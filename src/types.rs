//! Shared types for WAGERBOOK.
//!
//! These types form the data model used across the engine, ledger and
//! storage modules. Validated values (`Wager`, `Market`) are only built by
//! the input validator, so settlement code can rely on their invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Market variant
// ---------------------------------------------------------------------------

/// The shape of a market, which decides how the pool is redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketVariant {
    /// Yes/No market.
    Binary,
    /// Any number of discrete option labels.
    MultiOption,
    /// Numeric guesses paid by closeness to the resolved target.
    TargetProximity,
}

impl MarketVariant {
    /// All known variants (useful for iteration).
    pub const ALL: &'static [MarketVariant] = &[
        MarketVariant::Binary,
        MarketVariant::MultiOption,
        MarketVariant::TargetProximity,
    ];

    /// Whether wagers in this variant pick a discrete label.
    pub fn is_discrete(&self) -> bool {
        !matches!(self, MarketVariant::TargetProximity)
    }
}

impl fmt::Display for MarketVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketVariant::Binary => write!(f, "binary"),
            MarketVariant::MultiOption => write!(f, "multi_option"),
            MarketVariant::TargetProximity => write!(f, "target_proximity"),
        }
    }
}

/// Parse a variant name (case-insensitive, a few common aliases).
impl std::str::FromStr for MarketVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binary" | "yes_no" | "yesno" => Ok(MarketVariant::Binary),
            "multi_option" | "multioption" | "multiple_choice" | "multi" => {
                Ok(MarketVariant::MultiOption)
            }
            "target_proximity" | "targetproximity" | "proximity" | "target" => {
                Ok(MarketVariant::TargetProximity)
            }
            _ => Err(anyhow::anyhow!("Unknown market variant: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Wagers & markets
// ---------------------------------------------------------------------------

/// What a bettor picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    /// Discrete option label (Binary / MultiOption). Already normalized.
    Label(String),
    /// Numeric guess (TargetProximity).
    Guess(f64),
}

impl Selection {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Selection::Label(label) => Some(label),
            Selection::Guess(_) => None,
        }
    }

    pub fn as_guess(&self) -> Option<f64> {
        match self {
            Selection::Guess(guess) => Some(*guess),
            Selection::Label(_) => None,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Label(label) => write!(f, "{label}"),
            Selection::Guess(guess) => write!(f, "{guess}"),
        }
    }
}

/// A single validated stake in a closed market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub bettor_id: String,
    /// Optional human-readable name used when the ledger first sees this bettor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub selection: Selection,
    /// Stake, always >= 0.
    pub amount: f64,
    /// House cut on this wager's payoff, always in [0, 1].
    pub fee_rate: f64,
}

impl fmt::Display for Wager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ${:.2} (fee {:.1}%)",
            self.bettor_id,
            self.selection,
            self.amount,
            self.fee_rate * 100.0,
        )
    }
}

/// A closed market whose wagers have passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub variant: MarketVariant,
    pub wagers: Vec<Wager>,
    /// Market-level fee used for wagers that did not carry their own.
    pub default_fee: Option<f64>,
    /// Decay scale `s` (TargetProximity only, always > 0).
    pub decay_scale: Option<f64>,
    /// Whether MultiOption labels (and the outcome) are whitespace-trimmed.
    pub trim_labels: bool,
}

impl Market {
    /// Total pool M (sum of raw stakes).
    pub fn total_pool(&self) -> f64 {
        self.wagers.iter().map(|w| w.amount).sum()
    }

}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({} wagers, pool ${:.2})",
            self.variant,
            self.id,
            self.wagers.len(),
            self.total_pool(),
        )
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A resolved outcome, handed to the engine by whoever resolved the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Winning option label (Binary / MultiOption).
    Label(String),
    /// Numeric target (TargetProximity).
    Target(f64),
}

impl Outcome {
    /// Interpret raw CLI/text input for a given variant. Numeric text
    /// becomes a target only for TargetProximity markets.
    pub fn parse_for(variant: MarketVariant, raw: &str) -> Self {
        if variant.is_discrete() {
            return Outcome::Label(raw.to_string());
        }
        match raw.trim().parse::<f64>() {
            Ok(target) => Outcome::Target(target),
            Err(_) => Outcome::Label(raw.to_string()),
        }
    }
}

impl From<&str> for Outcome {
    fn from(label: &str) -> Self {
        Outcome::Label(label.to_string())
    }
}

impl From<String> for Outcome {
    fn from(label: String) -> Self {
        Outcome::Label(label)
    }
}

impl From<f64> for Outcome {
    fn from(target: f64) -> Self {
        Outcome::Target(target)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Label(label) => write!(f, "{label}"),
            Outcome::Target(target) => write!(f, "{target}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Settlement output
// ---------------------------------------------------------------------------

/// Per-wager diagnostics for TargetProximity settlement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityDetail {
    /// |guess - target|
    pub error: f64,
    /// exp(-error / s)
    pub proximity: f64,
    /// amount * proximity
    pub effective_weight: f64,
}

/// Settlement outcome for one wager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub bettor_id: String,
    pub amount: f64,
    pub payoff: f64,
    /// Always `payoff - amount`.
    pub pnl: f64,
    /// Variant-specific win flag, as fed to the ledger.
    pub did_win: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity: Option<ProximityDetail>,
}

impl SettlementResult {
    pub fn new(bettor_id: &str, amount: f64, payoff: f64, did_win: bool) -> Self {
        Self {
            bettor_id: bettor_id.to_string(),
            amount,
            payoff,
            pnl: payoff - amount,
            did_win,
            proximity: None,
        }
    }

    pub fn with_proximity(mut self, detail: ProximityDetail) -> Self {
        self.proximity = Some(detail);
        self
    }
}

impl fmt::Display for SettlementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.pnl >= 0.0 { "+" } else { "" };
        write!(
            f,
            "{}: staked ${:.2} paid ${:.2} ({sign}{:.2}){}",
            self.bettor_id,
            self.amount,
            self.payoff,
            self.pnl,
            if self.did_win { " WIN" } else { "" },
        )
    }
}

/// How the pool was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    /// Pool redistributed according to the payout formula.
    Distributed,
    /// Nobody staked on the outcome (or every proximity weight vanished):
    /// the house retains the entire pool.
    NoWinningStake,
    /// Nothing was staked at all.
    EmptyPool,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolStatus::Distributed => write!(f, "distributed"),
            PoolStatus::NoWinningStake => write!(f, "no winning stake"),
            PoolStatus::EmptyPool => write!(f, "empty pool"),
        }
    }
}

/// Summary of one settled market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    pub id: Uuid,
    pub market_id: String,
    pub variant: MarketVariant,
    /// Normalized outcome actually used for settlement.
    pub outcome: Outcome,
    /// M: sum of all stakes.
    pub total_pool: f64,
    /// Mwin for discrete markets, W (sum of effective weights) for proximity.
    pub winning_pool: f64,
    pub total_payoff: f64,
    pub status: PoolStatus,
    pub settled_at: DateTime<Utc>,
    /// One entry per wager, in input order.
    pub results: Vec<SettlementResult>,
}

impl SettlementReport {
    /// What the house kept: M - sum(payoff).
    pub fn house_take(&self) -> f64 {
        self.total_pool - self.total_payoff
    }

    /// Number of wagers flagged as wins.
    pub fn winners(&self) -> usize {
        self.results.iter().filter(|r| r.did_win).count()
    }

    pub fn result_for(&self, bettor_id: &str) -> Option<&SettlementResult> {
        self.results.iter().find(|r| r.bettor_id == bettor_id)
    }
}

impl fmt::Display for SettlementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} outcome={} | pool=${:.2} paid=${:.2} house=${:.2} | winners={}/{} | {}",
            self.variant,
            self.market_id,
            self.outcome,
            self.total_pool,
            self.total_payoff,
            self.house_take(),
            self.winners(),
            self.results.len(),
            self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

fn bettor_suffix(bettor_id: &Option<String>) -> String {
    match bettor_id {
        Some(id) => format!(" (bettor {id})"),
        None => String::new(),
    }
}

/// Rejection of a raw market before any settlement math runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field `{field}`{}", bettor_suffix(.bettor_id))]
    MissingField {
        field: &'static str,
        bettor_id: Option<String>,
    },

    #[error("Invalid selection '{selection}' for bettor {bettor_id}")]
    InvalidSelection { bettor_id: String, selection: String },

    #[error("Negative amount {amount} for bettor {bettor_id}")]
    NegativeAmount { bettor_id: String, amount: f64 },

    #[error("Non-numeric value '{value}' in `{field}`{}", bettor_suffix(.bettor_id))]
    NonNumericValue {
        field: &'static str,
        value: String,
        bettor_id: Option<String>,
    },

    #[error("Missing fee for bettor {bettor_id} and no market default")]
    MissingFee { bettor_id: String },

    #[error("Fee {fee} outside [0, 1]{}", bettor_suffix(.bettor_id))]
    FeeOutOfRange { fee: f64, bettor_id: Option<String> },

    #[error("Decay scale must be > 0, got {scale}")]
    InvalidScaleParameter { scale: f64 },

    #[error("Invalid outcome '{outcome}' for {variant} market")]
    InvalidOutcome {
        variant: MarketVariant,
        outcome: String,
    },
}

/// Failure while committing settlement results to the ledger.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Non-finite {field} ({value}) for player {player_id}")]
    NonFiniteValue {
        player_id: String,
        field: &'static str,
        value: f64,
    },

    #[error("Empty player id")]
    EmptyPlayerId,
}

/// Anything that can stop a settlement call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettlementError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ledger update aborted: {0}")]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
