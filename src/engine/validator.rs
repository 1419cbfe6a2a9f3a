//! Input validator.
//!
//! Turns loosely-typed market input (as it arrives from JSON or a REST
//! layer) into a validated `Market`. Validation is all-or-nothing: the first
//! bad field rejects the whole market and nothing is returned.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::SettlementConfig;
use crate::types::{Market, MarketVariant, Selection, ValidationError, Wager};

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One wager as supplied by the caller. Numeric fields accept JSON numbers
/// or numeric strings; `null` counts as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWager {
    #[serde(default, alias = "player_id")]
    pub bettor_id: Option<String>,
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
    #[serde(default, alias = "choice", alias = "guess")]
    pub selection: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default, alias = "cut")]
    pub fee: Option<Value>,
}

impl RawWager {
    pub fn new(bettor_id: &str, selection: impl Into<Value>, amount: impl Into<Value>) -> Self {
        Self {
            bettor_id: Some(bettor_id.to_string()),
            selection: Some(selection.into()),
            amount: Some(amount.into()),
            ..Default::default()
        }
    }

    pub fn with_fee(mut self, fee: impl Into<Value>) -> Self {
        self.fee = Some(fee.into());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }
}

/// A closed market as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMarket {
    #[serde(default)]
    pub id: Option<String>,
    pub variant: MarketVariant,
    #[serde(default)]
    pub wagers: Vec<RawWager>,
    #[serde(default, alias = "default_cut")]
    pub default_fee: Option<Value>,
    #[serde(default, alias = "s")]
    pub decay_scale: Option<Value>,
    #[serde(default)]
    pub default_buy_in: Option<Value>,
    #[serde(default)]
    pub trim_labels: Option<bool>,
}

impl RawMarket {
    pub fn new(variant: MarketVariant, wagers: Vec<RawWager>) -> Self {
        Self {
            id: None,
            variant,
            wagers,
            default_fee: None,
            decay_scale: None,
            default_buy_in: None,
            trim_labels: None,
        }
    }

    pub fn with_default_fee(mut self, fee: f64) -> Self {
        self.default_fee = Some(fee.into());
        self
    }

    pub fn with_decay_scale(mut self, scale: f64) -> Self {
        self.decay_scale = Some(scale.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Validates raw markets against market-level defaults from config.
#[derive(Debug, Clone, Default)]
pub struct InputValidator {
    defaults: SettlementConfig,
}

impl InputValidator {
    pub fn new(defaults: SettlementConfig) -> Self {
        Self { defaults }
    }

    /// Validate and normalize a raw market.
    pub fn validate(&self, raw: &RawMarket) -> Result<Market, ValidationError> {
        let default_fee = match present(&raw.default_fee) {
            Some(v) => Some(number(v, "default_fee", None)?),
            None => self.defaults.default_fee,
        };
        if let Some(fee) = default_fee {
            check_fee(fee, None)?;
        }

        let trim_labels = raw.trim_labels.unwrap_or(self.defaults.trim_labels);

        let decay_scale = match raw.variant {
            MarketVariant::TargetProximity => {
                let scale = match present(&raw.decay_scale) {
                    Some(v) => number(v, "decay_scale", None)?,
                    None => self.defaults.decay_scale,
                };
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(ValidationError::InvalidScaleParameter { scale });
                }
                Some(scale)
            }
            _ => None,
        };

        let default_buy_in = match raw.variant {
            MarketVariant::TargetProximity => match present(&raw.default_buy_in) {
                Some(v) => Some(number(v, "default_buy_in", None)?),
                None => self.defaults.default_buy_in,
            },
            _ => None,
        };

        let wagers = raw
            .wagers
            .iter()
            .map(|w| self.validate_wager(raw.variant, w, default_fee, default_buy_in, trim_labels))
            .collect::<Result<Vec<_>, _>>()?;

        let id = raw
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        debug!(
            market_id = %id,
            variant = %raw.variant,
            wagers = wagers.len(),
            "Market validated"
        );

        Ok(Market {
            id,
            variant: raw.variant,
            wagers,
            default_fee,
            decay_scale,
            trim_labels,
        })
    }

    fn validate_wager(
        &self,
        variant: MarketVariant,
        raw: &RawWager,
        default_fee: Option<f64>,
        default_buy_in: Option<f64>,
        trim_labels: bool,
    ) -> Result<Wager, ValidationError> {
        let bettor_id = raw
            .bettor_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingField {
                field: "bettor_id",
                bettor_id: None,
            })?
            .to_string();

        let selection = match variant {
            MarketVariant::Binary => binary_selection(&bettor_id, &raw.selection)?,
            MarketVariant::MultiOption => {
                option_selection(&bettor_id, &raw.selection, trim_labels)?
            }
            MarketVariant::TargetProximity => {
                let value = present(&raw.selection).ok_or_else(|| ValidationError::MissingField {
                    field: "guess",
                    bettor_id: Some(bettor_id.clone()),
                })?;
                Selection::Guess(number(value, "guess", Some(&bettor_id))?)
            }
        };

        let amount = match present(&raw.amount) {
            Some(v) => number(v, "amount", Some(&bettor_id))?,
            None => default_buy_in.ok_or_else(|| ValidationError::MissingField {
                field: "amount",
                bettor_id: Some(bettor_id.clone()),
            })?,
        };
        if amount < 0.0 {
            return Err(ValidationError::NegativeAmount { bettor_id, amount });
        }

        let fee_rate = match present(&raw.fee) {
            Some(v) => number(v, "fee", Some(&bettor_id))?,
            None => default_fee.ok_or_else(|| ValidationError::MissingFee {
                bettor_id: bettor_id.clone(),
            })?,
        };
        check_fee(fee_rate, Some(&bettor_id))?;

        let display_name = raw
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(Wager {
            bettor_id,
            display_name,
            selection,
            amount,
            fee_rate,
        })
    }
}

// ---------------------------------------------------------------------------
// Field validators
// ---------------------------------------------------------------------------

fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

/// Coerce a JSON number or numeric string into a finite f64.
fn number(
    value: &Value,
    field: &'static str,
    bettor_id: Option<&str>,
) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::NonNumericValue {
            field,
            value: text(value),
            bettor_id: bettor_id.map(str::to_string),
        }),
    }
}

fn check_fee(fee: f64, bettor_id: Option<&str>) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&fee) {
        Ok(())
    } else {
        Err(ValidationError::FeeOutOfRange {
            fee,
            bettor_id: bettor_id.map(str::to_string),
        })
    }
}

/// Render a JSON scalar the way it would be shown to a user.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric labels are rendered through f64 so `3`, `3.0` and a numeric
/// outcome of 3 all become `"3"`.
fn label_text(value: &Value) -> String {
    match value {
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        other => text(other),
    }
}

fn binary_selection(bettor_id: &str, value: &Option<Value>) -> Result<Selection, ValidationError> {
    let value = present(value).ok_or_else(|| ValidationError::MissingField {
        field: "selection",
        bettor_id: Some(bettor_id.to_string()),
    })?;
    let normalized = text(value).trim().to_lowercase();
    match normalized.as_str() {
        "yes" | "no" => Ok(Selection::Label(normalized)),
        _ => Err(ValidationError::InvalidSelection {
            bettor_id: bettor_id.to_string(),
            selection: text(value),
        }),
    }
}

fn option_selection(
    bettor_id: &str,
    value: &Option<Value>,
    trim_labels: bool,
) -> Result<Selection, ValidationError> {
    let value = present(value).ok_or_else(|| ValidationError::MissingField {
        field: "selection",
        bettor_id: Some(bettor_id.to_string()),
    })?;
    if value.is_array() || value.is_object() {
        return Err(ValidationError::InvalidSelection {
            bettor_id: bettor_id.to_string(),
            selection: value.to_string(),
        });
    }
    let raw = label_text(value);
    let label = if trim_labels { raw.trim().to_string() } else { raw.clone() };
    if label.trim().is_empty() {
        return Err(ValidationError::InvalidSelection {
            bettor_id: bettor_id.to_string(),
            selection: raw,
        });
    }
    Ok(Selection::Label(label))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
