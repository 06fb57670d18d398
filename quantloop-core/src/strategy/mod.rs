//! Strategy trait and the bundled demonstration strategies.

pub mod buy_and_hold;
pub mod random_forecast;

pub use buy_and_hold::BuyAndHoldStrategy;
pub use random_forecast::RandomForecastStrategy;

use crate::data::MarketData;
use crate::events::SignalEvent;

/// Produces signals from bars — nothing else.
///
/// Called once per market event. A strategy that cannot decide returns an
/// empty vector; it never errors on normal data. Position awareness and
/// sizing are deliberately absent from this seam: they belong to the
/// portfolio.
pub trait Strategy {
    /// Human-readable name for reports.
    fn name(&self) -> &str;

    /// Ordered signals for the current time step.
    fn generate_signals(&mut self, data: &dyn MarketData) -> Vec<SignalEvent>;
}
