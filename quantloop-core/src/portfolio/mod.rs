//! Portfolio — the central state machine.
//!
//! Consumes signals to produce orders (sizing), consumes fills to mutate
//! the ledgers, and advances the per-bar snapshot histories. The portfolio
//! is the sole owner and mutator of both ledgers; every other component
//! sees them only through read-only history accessors.

pub mod equity;
pub mod ledger;
pub mod naive;

pub use equity::{EquityCurve, EquityPoint};
pub use ledger::{CurrentHoldings, HoldingsSnapshot, PositionsSnapshot};
pub use naive::{CommissionFallback, GapPolicy, NaivePortfolio, PortfolioError};

use crate::data::MarketData;
use crate::events::{FillEvent, OrderEvent, SignalEvent};

/// Capability contract for portfolio implementations.
///
/// The engine drives exactly three mutating operations, always from the
/// single dispatch loop: signal sizing, per-bar timeline advance, and fill
/// application. Implementations own all position/holdings state.
pub trait Portfolio {
    /// React to a signal: produce at most one order, or `None` for an
    /// explicit no-op.
    fn update_signal(&mut self, signal: &SignalEvent) -> Result<Option<OrderEvent>, PortfolioError>;

    /// Append one positions snapshot and one holdings snapshot for the
    /// current bar, before that bar's fills are applied.
    fn update_timeindex(&mut self, data: &dyn MarketData) -> Result<(), PortfolioError>;

    /// Apply a fill to positions, cash, and commission.
    fn update_fill(&mut self, fill: &FillEvent, data: &dyn MarketData) -> Result<(), PortfolioError>;

    /// Append-only positions history, one snapshot per time step.
    fn positions_history(&self) -> &[PositionsSnapshot];

    /// Append-only holdings history, parallel to the positions history.
    fn holdings_history(&self) -> &[HoldingsSnapshot];
}
