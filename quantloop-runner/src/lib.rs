//! Quantloop Runner — orchestration on top of `quantloop-core`.
//!
//! This crate builds on the engine to provide:
//! - Serializable TOML backtest configuration with validation
//! - Bar loading from per-symbol CSV files or a seeded synthetic generator
//! - A single-backtest runner producing a full result artifact
//! - Performance metrics over the finished equity curve

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod runner;

pub use config::{BacktestConfig, CommissionConfig, ConfigError, DataConfig, StrategyConfig};
pub use data_loader::{load_csv_dir, synthetic_bars, LoadError};
pub use metrics::PerformanceSummary;
pub use runner::{run_single_backtest, BacktestResult, RunError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn performance_summary_is_send_sync() {
        assert_send::<PerformanceSummary>();
        assert_sync::<PerformanceSummary>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
    }
}
