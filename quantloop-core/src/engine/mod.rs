//! The bar-by-bar dispatch loop.
//!
//! Outer stage: advance the market-data cursor one bar and enqueue a
//! Market event. Inner stage: drain the queue to empty, dispatching each
//! event to its subscriber — Strategy for Market, Portfolio for Signal and
//! Fill, ExecutionHandler for Order. Events produced mid-drain join the
//! same drain, so a fill is always consumed before the next bar's Market
//! event is issued. The loop halts when the data source is exhausted and
//! the queue is empty; an empty queue is a poll result, never a wait.

use crate::data::{DataFeedStatus, MarketData};
use crate::events::Event;
use crate::execution::{ExecutionError, ExecutionHandler};
use crate::portfolio::{
    EquityCurve, HoldingsSnapshot, Portfolio, PortfolioError, PositionsSnapshot,
};
use crate::queue::EventQueue;
use crate::strategy::Strategy;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Run-time failures, annotated with the offending bar for diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no timestamp available at bar {bar}")]
    MissingTimestamp { bar: usize },

    #[error("portfolio error at bar {bar} ({timestamp}): {source}")]
    Portfolio {
        bar: usize,
        timestamp: DateTime<Utc>,
        #[source]
        source: PortfolioError,
    },

    #[error("execution error at bar {bar}: {source}")]
    Execution {
        bar: usize,
        #[source]
        source: ExecutionError,
    },
}

/// Everything a finished run leaves behind.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub strategy: String,
    pub bars_processed: usize,
    pub signals: usize,
    pub orders: usize,
    pub fills: usize,
    pub positions_history: Vec<PositionsSnapshot>,
    pub holdings_history: Vec<HoldingsSnapshot>,
    pub equity_curve: EquityCurve,
    /// Every event in dispatch order — the causal record of the run.
    pub trace: Vec<Event>,
}

/// Owns the queue and the four components, and drives the dispatch cycle.
pub struct Backtest {
    data: Box<dyn MarketData>,
    strategy: Box<dyn Strategy>,
    portfolio: Box<dyn Portfolio>,
    execution: Box<dyn ExecutionHandler>,
    queue: EventQueue,
    trace: Vec<Event>,
    bars_processed: usize,
}

impl Backtest {
    pub fn new(
        data: Box<dyn MarketData>,
        strategy: Box<dyn Strategy>,
        portfolio: Box<dyn Portfolio>,
        execution: Box<dyn ExecutionHandler>,
    ) -> Self {
        Self {
            data,
            strategy,
            portfolio,
            execution,
            queue: EventQueue::new(),
            trace: Vec::new(),
            bars_processed: 0,
        }
    }

    /// Run to data exhaustion and produce the report.
    pub fn run(mut self) -> Result<BacktestReport, EngineError> {
        while let DataFeedStatus::Advanced = self.data.update_bars() {
            self.bars_processed += 1;
            self.queue.push(Event::Market);
            self.drain()?;
        }
        Ok(self.into_report())
    }

    /// Process every queued event, including those produced mid-drain.
    fn drain(&mut self) -> Result<(), EngineError> {
        let bar = self.bars_processed;
        let now = self
            .data
            .latest_timestamp()
            .ok_or(EngineError::MissingTimestamp { bar })?;

        while let Some(event) = self.queue.pop() {
            match &event {
                Event::Market => {
                    // Snapshot first: the timeline advance must see the
                    // positions as of the previous bar's close.
                    self.portfolio
                        .update_timeindex(self.data.as_ref())
                        .map_err(|source| EngineError::Portfolio {
                            bar,
                            timestamp: now,
                            source,
                        })?;
                    for signal in self.strategy.generate_signals(self.data.as_ref()) {
                        self.queue.push(Event::Signal(signal));
                    }
                }
                Event::Signal(signal) => {
                    let order = self.portfolio.update_signal(signal).map_err(|source| {
                        EngineError::Portfolio {
                            bar,
                            timestamp: now,
                            source,
                        }
                    })?;
                    if let Some(order) = order {
                        self.queue.push(Event::Order(order));
                    }
                }
                Event::Order(order) => {
                    let fill = self
                        .execution
                        .execute_order(order, now)
                        .map_err(|source| EngineError::Execution { bar, source })?;
                    self.queue.push(Event::Fill(fill));
                }
                Event::Fill(fill) => {
                    self.portfolio
                        .update_fill(fill, self.data.as_ref())
                        .map_err(|source| EngineError::Portfolio {
                            bar,
                            timestamp: now,
                            source,
                        })?;
                }
            }
            self.trace.push(event);
        }
        Ok(())
    }

    fn into_report(self) -> BacktestReport {
        let mut signals = 0;
        let mut orders = 0;
        let mut fills = 0;
        for event in &self.trace {
            match event {
                Event::Market => {}
                Event::Signal(_) => signals += 1,
                Event::Order(_) => orders += 1,
                Event::Fill(_) => fills += 1,
            }
        }

        let holdings_history = self.portfolio.holdings_history().to_vec();
        let equity_curve = EquityCurve::from_holdings(&holdings_history);
        BacktestReport {
            strategy: self.strategy.name().to_string(),
            bars_processed: self.bars_processed,
            signals,
            orders,
            fills,
            positions_history: self.portfolio.positions_history().to_vec(),
            holdings_history,
            equity_curve,
            trace: self.trace,
        }
    }
}
