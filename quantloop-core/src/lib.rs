//! Quantloop Core — event-driven backtesting engine.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (bars, the four-variant event union)
//! - A strictly FIFO event queue with poll semantics
//! - Market data handler abstraction with an in-memory historic feed
//! - Strategy trait plus buy-and-hold and random-forecast variants
//! - Portfolio state machine: signal sizing, per-bar ledgers, fill application
//! - Simulated execution handler with pluggable commission models
//! - The bar-by-bar dispatch loop that drives everything

pub mod data;
pub mod domain;
pub mod engine;
pub mod events;
pub mod execution;
pub mod portfolio;
pub mod queue;
pub mod strategy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine types are Send + Sync.
    ///
    /// The dispatch loop itself is single-threaded, but independent backtests
    /// (one portfolio each) must be free to run on separate threads. If any
    /// type fails this check, the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();

        // Event taxonomy
        require_send::<events::Event>();
        require_sync::<events::Event>();
        require_send::<events::SignalEvent>();
        require_sync::<events::SignalEvent>();
        require_send::<events::OrderEvent>();
        require_sync::<events::OrderEvent>();
        require_send::<events::FillEvent>();
        require_sync::<events::FillEvent>();

        // Queue and feed
        require_send::<queue::EventQueue>();
        require_sync::<queue::EventQueue>();
        require_send::<data::HistoricBars>();
        require_sync::<data::HistoricBars>();

        // Portfolio state
        require_send::<portfolio::NaivePortfolio>();
        require_sync::<portfolio::NaivePortfolio>();
        require_send::<portfolio::PositionsSnapshot>();
        require_sync::<portfolio::PositionsSnapshot>();
        require_send::<portfolio::HoldingsSnapshot>();
        require_sync::<portfolio::HoldingsSnapshot>();
        require_send::<portfolio::EquityCurve>();
        require_sync::<portfolio::EquityCurve>();

        // Execution
        require_send::<execution::SimulatedExecutionHandler>();
        require_sync::<execution::SimulatedExecutionHandler>();

        // Strategies
        require_send::<strategy::BuyAndHoldStrategy>();
        require_sync::<strategy::BuyAndHoldStrategy>();
        require_send::<strategy::RandomForecastStrategy>();
        require_sync::<strategy::RandomForecastStrategy>();

        // Engine output
        require_send::<engine::BacktestReport>();
        require_sync::<engine::BacktestReport>();
    }

    /// Architecture contract: `Strategy::generate_signals` does NOT accept
    /// portfolio state.
    ///
    /// Strategies see market data only — sizing and position awareness live
    /// in the portfolio. If someone adds a portfolio parameter, the trait
    /// changes and all implementations break. This test documents the
    /// contract explicitly.
    #[test]
    fn strategy_trait_has_no_portfolio_parameter() {
        fn _check_trait_object_builds(
            strat: &mut dyn strategy::Strategy,
            data: &dyn data::MarketData,
        ) -> Vec<events::SignalEvent> {
            strat.generate_signals(data)
        }
    }
}
