//! Naive portfolio: constant-quantity sizing with no risk model.
//!
//! The only state the sizing policy consults is the scalar net position per
//! symbol. Orders are never split or throttled; fills are applied at the
//! latest close (the mark-price fill model, kept deliberately — see
//! `update_fill`).

use crate::data::MarketData;
use crate::events::{EventError, FillEvent, OrderEvent, Side, SignalDirection, SignalEvent};
use crate::portfolio::equity::EquityCurve;
use crate::portfolio::ledger::{CurrentHoldings, HoldingsSnapshot, PositionsSnapshot};
use crate::portfolio::Portfolio;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Portfolio construction and run-time failures.
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("symbol universe is empty")]
    EmptyUniverse,

    #[error("initial capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("duplicate symbol in universe: {0}")]
    DuplicateSymbol(String),

    #[error("symbol not in universe: {0}")]
    UnknownSymbol(String),

    #[error("no market data has been released yet")]
    NoMarketData,

    #[error("data gap: no bar for '{symbol}' at {timestamp}")]
    DataGap {
        symbol: String,
        timestamp: DateTime<Utc>,
    },

    #[error("no price available for '{symbol}'")]
    MissingPrice { symbol: String },

    #[error("fill for '{symbol}' carries no commission and the fallback policy rejects it")]
    UnresolvedCommission { symbol: String },

    #[error(transparent)]
    Event(#[from] EventError),
}

/// What the timeline advance does when a symbol has no bar for the current
/// step.
///
/// The engine never substitutes a zero price — the choice is between
/// stopping the run and explicitly re-using the last known mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapPolicy {
    /// Stop the run with a `DataGap` error (default — silently wrong
    /// results are worse than no results).
    #[default]
    Abort,
    /// Mark the position at the symbol's last released close.
    CarryForward,
}

/// How a fill whose commission was never computed (`commission: None`) is
/// resolved when it reaches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionFallback {
    /// Treat the fill as costless.
    #[default]
    Zero,
    /// Fail the run — commissions must come from a configured model.
    Reject,
}

/// The naive portfolio implementation.
///
/// Ledger layout: one mutable current projection (`current_positions`,
/// `current`) plus two append-only histories that each gain exactly one
/// entry per time step.
#[derive(Debug, Clone)]
pub struct NaivePortfolio {
    symbols: Vec<String>,
    initial_capital: f64,
    gap_policy: GapPolicy,
    commission_fallback: CommissionFallback,
    current_positions: BTreeMap<String, i64>,
    current: CurrentHoldings,
    all_positions: Vec<PositionsSnapshot>,
    all_holdings: Vec<HoldingsSnapshot>,
}

impl NaivePortfolio {
    /// Construct with a fixed universe, a starting timestamp for the
    /// initial snapshots, and starting capital.
    ///
    /// Invalid configuration is fatal here — a run never starts with an
    /// empty universe or non-positive capital.
    pub fn new(
        symbols: &[String],
        start: DateTime<Utc>,
        initial_capital: f64,
    ) -> Result<Self, PortfolioError> {
        if symbols.is_empty() {
            return Err(PortfolioError::EmptyUniverse);
        }
        if !(initial_capital > 0.0) {
            return Err(PortfolioError::NonPositiveCapital(initial_capital));
        }

        let mut current_positions: BTreeMap<String, i64> = BTreeMap::new();
        for symbol in symbols {
            if current_positions.insert(symbol.clone(), 0).is_some() {
                return Err(PortfolioError::DuplicateSymbol(symbol.clone()));
            }
        }

        let current = CurrentHoldings::new(symbols, initial_capital);
        let all_positions = vec![PositionsSnapshot {
            timestamp: start,
            positions: current_positions.clone(),
        }];
        let all_holdings = vec![HoldingsSnapshot {
            timestamp: start,
            market_value: current.market_value.clone(),
            cash: current.cash,
            commission: current.commission,
            total: current.total,
        }];

        Ok(Self {
            symbols: symbols.to_vec(),
            initial_capital,
            gap_policy: GapPolicy::default(),
            commission_fallback: CommissionFallback::default(),
            current_positions,
            current,
            all_positions,
            all_holdings,
        })
    }

    pub fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    pub fn with_commission_fallback(mut self, fallback: CommissionFallback) -> Self {
        self.commission_fallback = fallback;
        self
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Current signed net position for a symbol, `None` outside the universe.
    pub fn current_position(&self, symbol: &str) -> Option<i64> {
        self.current_positions.get(symbol).copied()
    }

    pub fn current_holdings(&self) -> &CurrentHoldings {
        &self.current
    }

    /// Derive the equity curve from the holdings history accumulated so far.
    pub fn equity_curve(&self) -> EquityCurve {
        EquityCurve::from_holdings(&self.all_holdings)
    }

    fn resolve_commission(&self, fill: &FillEvent) -> Result<f64, PortfolioError> {
        match fill.commission() {
            Some(c) => Ok(c),
            None => match self.commission_fallback {
                CommissionFallback::Zero => Ok(0.0),
                CommissionFallback::Reject => Err(PortfolioError::UnresolvedCommission {
                    symbol: fill.symbol().to_string(),
                }),
            },
        }
    }

    /// Mark price for one symbol during a timeline advance, honoring the
    /// gap policy. `position` decides whether a never-traded symbol is an
    /// error or just worth nothing.
    fn mark_price(
        &self,
        data: &dyn MarketData,
        symbol: &str,
        now: DateTime<Utc>,
        position: i64,
    ) -> Result<Option<f64>, PortfolioError> {
        match data.latest_bar(symbol) {
            Ok(bar) if bar.timestamp == now => Ok(Some(bar.close)),
            Ok(stale) => match self.gap_policy {
                GapPolicy::Abort => Err(PortfolioError::DataGap {
                    symbol: symbol.to_string(),
                    timestamp: now,
                }),
                GapPolicy::CarryForward => Ok(Some(stale.close)),
            },
            Err(_) => match self.gap_policy {
                GapPolicy::Abort => Err(PortfolioError::DataGap {
                    symbol: symbol.to_string(),
                    timestamp: now,
                }),
                GapPolicy::CarryForward if position == 0 => Ok(None),
                GapPolicy::CarryForward => Err(PortfolioError::MissingPrice {
                    symbol: symbol.to_string(),
                }),
            },
        }
    }
}

impl Portfolio for NaivePortfolio {
    /// Signal → order, per the naive sizing table.
    ///
    /// quantity = floor(100 × strength); entries only from flat, exits only
    /// from a position; everything else is an explicit no-op, not an error.
    fn update_signal(
        &mut self,
        signal: &SignalEvent,
    ) -> Result<Option<OrderEvent>, PortfolioError> {
        let symbol = signal.symbol();
        let position = *self
            .current_positions
            .get(symbol)
            .ok_or_else(|| PortfolioError::UnknownSymbol(symbol.to_string()))?;

        let sized = (100.0 * signal.strength()).floor() as u64;
        let order = match (signal.direction(), position) {
            (SignalDirection::Long, 0) => Some((sized, Side::Buy)),
            (SignalDirection::Short, 0) => Some((sized, Side::Sell)),
            (SignalDirection::Exit, p) if p > 0 => Some((p.unsigned_abs(), Side::Sell)),
            (SignalDirection::Exit, p) if p < 0 => Some((p.unsigned_abs(), Side::Buy)),
            _ => None,
        };

        match order {
            // A zero-quantity order is never constructed (strength too weak
            // to buy a single unit).
            Some((quantity, side)) if quantity > 0 => {
                Ok(Some(OrderEvent::market(symbol, quantity, side)?))
            }
            _ => Ok(None),
        }
    }

    /// Append the per-bar snapshots, before this bar's fills.
    ///
    /// Positions are copied forward unchanged (look-ahead avoidance: the
    /// snapshot reflects the close of the previous bar). Market values are
    /// re-marked at the latest close; cash and commission carry forward.
    fn update_timeindex(&mut self, data: &dyn MarketData) -> Result<(), PortfolioError> {
        let now = data.latest_timestamp().ok_or(PortfolioError::NoMarketData)?;

        let mut market_value: BTreeMap<String, f64> = BTreeMap::new();
        let mut total = self.current.cash;
        for (symbol, &position) in &self.current_positions {
            let value = match self.mark_price(data, symbol, now, position)? {
                Some(price) => position as f64 * price,
                None => 0.0,
            };
            market_value.insert(symbol.clone(), value);
            total += value;
        }

        self.all_positions.push(PositionsSnapshot {
            timestamp: now,
            positions: self.current_positions.clone(),
        });
        self.all_holdings.push(HoldingsSnapshot {
            timestamp: now,
            market_value: market_value.clone(),
            cash: self.current.cash,
            commission: self.current.commission,
            total,
        });

        // Re-synchronize the current projection to the fresh marks.
        self.current.market_value = market_value;
        self.current.total = total;
        Ok(())
    }

    /// Fill → ledger mutation.
    ///
    /// Mark-price fill model: the cost basis is the latest close at the
    /// time the fill is applied, not an execution price carried on the
    /// fill. This conflation of mark and execution price is inherited from
    /// the simulated-fill design and kept as an explicit modeling choice.
    fn update_fill(
        &mut self,
        fill: &FillEvent,
        data: &dyn MarketData,
    ) -> Result<(), PortfolioError> {
        let symbol = fill.symbol();
        if !self.current_positions.contains_key(symbol) {
            return Err(PortfolioError::UnknownSymbol(symbol.to_string()));
        }

        let price = data
            .latest_bar(symbol)
            .map_err(|_| PortfolioError::MissingPrice {
                symbol: symbol.to_string(),
            })?
            .close;
        let commission = self.resolve_commission(fill)?;

        let multiplier = fill.side().multiplier();
        if let Some(position) = self.current_positions.get_mut(symbol) {
            *position += multiplier * fill.quantity() as i64;
        }

        let cost = multiplier as f64 * price * fill.quantity() as f64;
        if let Some(value) = self.current.market_value.get_mut(symbol) {
            *value += cost;
        }
        self.current.commission += commission;
        self.current.cash -= cost + commission;
        self.current.total -= cost + commission;
        Ok(())
    }

    fn positions_history(&self) -> &[PositionsSnapshot] {
        &self.all_positions
    }

    fn holdings_history(&self) -> &[HoldingsSnapshot] {
        &self.all_holdings
    }
}
