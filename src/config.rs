//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has defaults, so a missing file or a partial file is fine.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Market-level defaults applied by the input validator when a raw market
/// does not carry its own value.
#[derive(Debug, Deserialize, Clone)]
pub struct SettlementConfig {
    /// House cut for wagers without a per-wager fee.
    #[serde(default)]
    pub default_fee: Option<f64>,
    /// Decay scale `s` for TargetProximity markets.
    #[serde(default = "default_decay_scale")]
    pub decay_scale: f64,
    /// Stake assumed for TargetProximity wagers with no amount.
    #[serde(default)]
    pub default_buy_in: Option<f64>,
    /// Trim whitespace from MultiOption labels.
    #[serde(default = "default_trim_labels")]
    pub trim_labels: bool,
}

fn default_decay_scale() -> f64 {
    3.0
}

fn default_trim_labels() -> bool {
    true
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            default_fee: None,
            decay_scale: default_decay_scale(),
            default_buy_in: None,
            trim_labels: default_trim_labels(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
}

fn default_ledger_path() -> String {
    "wagerbook_ledger.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject defaults the validator would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        let s = &self.settlement;
        if let Some(fee) = s.default_fee {
            if !(0.0..=1.0).contains(&fee) {
                bail!("settlement.default_fee must be within [0, 1], got {fee}");
            }
        }
        if !(s.decay_scale.is_finite() && s.decay_scale > 0.0) {
            bail!("settlement.decay_scale must be > 0, got {}", s.decay_scale);
        }
        if let Some(buy_in) = s.default_buy_in {
            if !(buy_in.is_finite() && buy_in >= 0.0) {
                bail!("settlement.default_buy_in must be >= 0, got {buy_in}");
            }
        }
        if self.storage.ledger_path.trim().is_empty() {
            bail!("storage.ledger_path must not be empty");
        }
        Ok(())
    }
}
