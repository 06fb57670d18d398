//! Serializable backtest configuration.
//!
//! A config captures everything needed to reproduce a run: universe,
//! capital, strategy, commission model, and data source. Two identical
//! configs hash to the same run id, so results can be compared or cached
//! by content.

use quantloop_core::execution::{
    CommissionModel, PerShareCommission, PerTradeCommission,
};
use quantloop_core::portfolio::{CommissionFallback, GapPolicy};
use quantloop_core::strategy::{BuyAndHoldStrategy, RandomForecastStrategy, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("symbol universe is empty")]
    NoSymbols,

    #[error("duplicate symbol in universe: {0}")]
    DuplicateSymbol(String),

    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("synthetic data needs at least 2 bars, got {0}")]
    TooFewBars(usize),
}

/// Serializable configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Universe of symbols to trade, fixed for the whole run.
    pub symbols: Vec<String>,

    /// Starting capital.
    pub initial_capital: f64,

    /// Strategy to drive the run.
    pub strategy: StrategyConfig,

    /// Commission model on the simulated execution handler.
    #[serde(default)]
    pub commission: CommissionConfig,

    /// How the portfolio resolves fills with uncomputed commission.
    #[serde(default)]
    pub commission_fallback: CommissionFallback,

    /// What the timeline advance does on a missing bar.
    #[serde(default)]
    pub gap_policy: GapPolicy,

    /// Where bars come from.
    pub data: DataConfig,
}

impl BacktestConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&input)
    }

    /// Refuse configurations the portfolio would reject anyway, but with a
    /// diagnostic before any data is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        let mut seen = BTreeSet::new();
        for symbol in &self.symbols {
            if !seen.insert(symbol) {
                return Err(ConfigError::DuplicateSymbol(symbol.clone()));
            }
        }
        if !(self.initial_capital > 0.0) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if let DataConfig::Synthetic { bars, .. } = &self.data {
            if *bars < 2 {
                return Err(ConfigError::TooFewBars(*bars));
            }
        }
        Ok(())
    }

    /// Deterministic content hash: identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Strategy selection (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyConfig {
    /// Go long each symbol once and hold to the end.
    BuyAndHold,

    /// Seeded random long/short forecasts.
    RandomForecast { seed: u64 },
}

impl StrategyConfig {
    /// Instantiate the configured strategy for a universe.
    pub fn build(&self, symbols: &[String]) -> Box<dyn Strategy> {
        match self {
            StrategyConfig::BuyAndHold => Box::new(BuyAndHoldStrategy::new()),
            StrategyConfig::RandomForecast { seed } => {
                Box::new(RandomForecastStrategy::new(symbols, *seed))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::BuyAndHold => "BuyAndHold",
            StrategyConfig::RandomForecast { .. } => "RandomForecast",
        }
    }
}

/// Commission model selection (serializable enum).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionConfig {
    /// No model: simulated fills carry an uncomputed commission and the
    /// portfolio's fallback policy decides.
    #[default]
    None,

    /// Per-unit commission.
    PerShare { amount: f64 },

    /// Flat per-trade commission.
    PerTrade { amount: f64 },
}

impl CommissionConfig {
    pub fn to_model(&self) -> Option<Box<dyn CommissionModel + Send + Sync>> {
        match self {
            CommissionConfig::None => None,
            CommissionConfig::PerShare { amount } => {
                Some(Box::new(PerShareCommission::new(*amount)))
            }
            CommissionConfig::PerTrade { amount } => {
                Some(Box::new(PerTradeCommission::new(*amount)))
            }
        }
    }
}

/// Bar source selection (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataConfig {
    /// One `<SYMBOL>.csv` per symbol under `dir`.
    Csv { dir: PathBuf },

    /// Seeded random-walk bars, aligned across the universe.
    Synthetic {
        bars: usize,
        #[serde(default = "default_seed")]
        seed: u64,
        #[serde(default = "default_start_price")]
        start_price: f64,
    },
}

fn default_seed() -> u64 {
    42
}

fn default_start_price() -> f64 {
    100.0
}
