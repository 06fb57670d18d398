//! Single-backtest runner: config in, result artifact out.

use crate::config::{BacktestConfig, ConfigError, DataConfig};
use crate::data_loader::{load_csv_dir, synthetic_bars, LoadError};
use crate::metrics::PerformanceSummary;
use quantloop_core::data::{DataError, HistoricBars, MarketData};
use quantloop_core::domain::Bar;
use quantloop_core::engine::{Backtest, BacktestReport, EngineError};
use quantloop_core::execution::SimulatedExecutionHandler;
use quantloop_core::portfolio::{NaivePortfolio, PortfolioError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("no bars loaded for the configured universe")]
    NoBars,

    #[error("loaded data covers symbols {found:?} but the config names {expected:?}")]
    UniverseMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Everything a single run produces, serializable as one artifact.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub run_id: String,
    pub config: BacktestConfig,
    pub report: BacktestReport,
    pub metrics: PerformanceSummary,
}

/// Load bars per the config's data section and run.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let bars = match &config.data {
        DataConfig::Csv { dir } => load_csv_dir(dir, &config.symbols)?,
        DataConfig::Synthetic {
            bars,
            seed,
            start_price,
        } => synthetic_bars(&config.symbols, *bars, *seed, *start_price),
    };
    run_backtest_from_bars(config, bars)
}

/// Run against bars the caller already has in memory.
pub fn run_backtest_from_bars(
    config: &BacktestConfig,
    bars: Vec<Bar>,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    if bars.is_empty() {
        return Err(RunError::NoBars);
    }

    let feed = HistoricBars::from_bars(bars)?;

    // The portfolio's universe must be exactly what the data covers.
    let mut expected = config.symbols.clone();
    expected.sort();
    let found = feed.symbols().to_vec();
    if expected != found {
        return Err(RunError::UniverseMismatch { expected, found });
    }

    let start = feed.start_timestamp().ok_or(RunError::NoBars)?;
    let portfolio = NaivePortfolio::new(&found, start, config.initial_capital)?
        .with_gap_policy(config.gap_policy)
        .with_commission_fallback(config.commission_fallback);
    let strategy = config.strategy.build(&found);

    let mut execution = SimulatedExecutionHandler::new();
    if let Some(model) = config.commission.to_model() {
        execution = execution.with_commission_model(model);
    }

    let report = Backtest::new(
        Box::new(feed),
        strategy,
        Box::new(portfolio),
        Box::new(execution),
    )
    .run()?;

    let metrics = PerformanceSummary::compute(&report.equity_curve.totals());
    Ok(BacktestResult {
        run_id: config.run_id(),
        config: config.clone(),
        report,
        metrics,
    })
}
