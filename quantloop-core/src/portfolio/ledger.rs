//! Fixed-shape ledger records.
//!
//! Snapshots use `BTreeMap` rather than `HashMap` so iteration — and
//! therefore serialized output — is deterministic, which the byte-identical
//! equity curve guarantee depends on. Histories are immutable once
//! appended; only the current projection advances.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Signed net position per symbol as of one time step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub positions: BTreeMap<String, i64>,
}

/// Valuation of the portfolio as of one time step.
///
/// Invariant: `total == cash + sum(market_value.values())` at the moment
/// the snapshot is appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub market_value: BTreeMap<String, f64>,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
}

/// The mutable "current" projection of the holdings ledger.
///
/// Fills adjust `cash`/`commission`/`market_value` immediately; `total` and
/// the per-symbol marks are only re-synchronized to prices at the next
/// timeline advance (accepted mark-to-market lag).
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentHoldings {
    pub market_value: BTreeMap<String, f64>,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
}

impl CurrentHoldings {
    pub fn new(symbols: &[String], initial_capital: f64) -> Self {
        Self {
            market_value: symbols.iter().map(|s| (s.clone(), 0.0)).collect(),
            cash: initial_capital,
            commission: 0.0,
            total: initial_capital,
        }
    }
}
