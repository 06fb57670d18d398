//! Market data handler abstraction and the in-memory historic feed.
//!
//! The engine never touches files or the network — bar acquisition is an
//! external concern. What the core needs is the `MarketData` contract:
//! release bars forward in time, one step per call, and answer "latest N
//! bars" queries without ever exposing future data.

use crate::domain::Bar;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Structured error types for feed construction and bar queries.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("no symbols supplied")]
    NoSymbols,

    #[error("empty bar series for symbol '{symbol}'")]
    EmptySeries { symbol: String },

    #[error("bars for symbol '{symbol}' are not in chronological order")]
    OutOfOrder { symbol: String },

    #[error("bar tagged '{found}' supplied under symbol '{symbol}'")]
    SymbolMismatch { symbol: String, found: String },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("no bars released yet for symbol '{symbol}'")]
    NoBars { symbol: String },
}

/// Outcome of advancing the feed one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFeedStatus {
    /// A new time step was released.
    Advanced,
    /// The historic data is exhausted; the run is over.
    Exhausted,
}

/// Contract between the engine and a bar source.
///
/// `latest_bars` returns chronological order, most-recent-last — consistent
/// everywhere. Implementations must only ever reveal bars at or before the
/// current cursor (no look-ahead).
pub trait MarketData {
    /// The fixed symbol universe, in construction order.
    fn symbols(&self) -> &[String];

    /// Up to the last `n` bars released for `symbol`, chronological.
    ///
    /// Fewer than `n` bars is not an error early in a run; zero bars is
    /// (`DataError::NoBars`).
    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar], DataError>;

    /// The single most recent bar released for `symbol`.
    fn latest_bar(&self, symbol: &str) -> Result<&Bar, DataError> {
        let bars = self.latest_bars(symbol, 1)?;
        bars.last().ok_or(DataError::NoBars {
            symbol: symbol.to_string(),
        })
    }

    /// Timestamp of the current time step, or `None` before the first one.
    fn latest_timestamp(&self) -> Option<DateTime<Utc>>;

    /// Release the next time step to consumers.
    fn update_bars(&mut self) -> DataFeedStatus;

    /// Whether more time steps remain.
    fn continue_backtest(&self) -> bool;
}

/// In-memory historic feed over a fixed universe.
///
/// The timeline is the sorted union of every symbol's timestamps, so
/// symbols with holes simply release nothing on the steps they are missing
/// — the portfolio's gap policy decides what happens then.
#[derive(Debug, Clone)]
pub struct HistoricBars {
    symbols: Vec<String>,
    /// Full chronological series per symbol, fixed at construction.
    series: BTreeMap<String, Vec<Bar>>,
    /// Sorted union of all timestamps across the universe.
    timeline: Vec<DateTime<Utc>>,
    /// Next timeline index to release.
    cursor: usize,
    /// How many bars of each series have been released so far.
    released: BTreeMap<String, usize>,
}

impl HistoricBars {
    /// Build a feed from per-symbol series.
    ///
    /// Each series must be non-empty, chronological, and tagged with its
    /// own symbol.
    pub fn new(series: BTreeMap<String, Vec<Bar>>) -> Result<Self, DataError> {
        if series.is_empty() {
            return Err(DataError::NoSymbols);
        }

        let mut timeline: Vec<DateTime<Utc>> = Vec::new();
        for (symbol, bars) in &series {
            if bars.is_empty() {
                return Err(DataError::EmptySeries {
                    symbol: symbol.clone(),
                });
            }
            for bar in bars {
                if bar.symbol != *symbol {
                    return Err(DataError::SymbolMismatch {
                        symbol: symbol.clone(),
                        found: bar.symbol.clone(),
                    });
                }
            }
            if bars.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
                return Err(DataError::OutOfOrder {
                    symbol: symbol.clone(),
                });
            }
            timeline.extend(bars.iter().map(|b| b.timestamp));
        }
        timeline.sort_unstable();
        timeline.dedup();

        let symbols: Vec<String> = series.keys().cloned().collect();
        let released = symbols.iter().map(|s| (s.clone(), 0)).collect();

        Ok(Self {
            symbols,
            series,
            timeline,
            cursor: 0,
            released,
        })
    }

    /// Build a feed from a flat bar list, grouping by symbol.
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self, DataError> {
        let mut series: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
        for bar in bars {
            series.entry(bar.symbol.clone()).or_default().push(bar);
        }
        for bars in series.values_mut() {
            bars.sort_by_key(|b| b.timestamp);
        }
        Self::new(series)
    }

    /// First timestamp on the timeline (the backtest start).
    pub fn start_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timeline.first().copied()
    }

    /// Total number of time steps on the timeline.
    pub fn timeline_len(&self) -> usize {
        self.timeline.len()
    }
}

impl MarketData for HistoricBars {
    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar], DataError> {
        let bars = self.series.get(symbol).ok_or_else(|| DataError::UnknownSymbol {
            symbol: symbol.to_string(),
        })?;
        let released = self.released.get(symbol).copied().unwrap_or(0);
        if released == 0 {
            return Err(DataError::NoBars {
                symbol: symbol.to_string(),
            });
        }
        let start = released.saturating_sub(n);
        Ok(&bars[start..released])
    }

    fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        if self.cursor == 0 {
            None
        } else {
            Some(self.timeline[self.cursor - 1])
        }
    }

    fn update_bars(&mut self) -> DataFeedStatus {
        if self.cursor >= self.timeline.len() {
            return DataFeedStatus::Exhausted;
        }
        let now = self.timeline[self.cursor];
        for (symbol, released) in self.released.iter_mut() {
            let Some(bars) = self.series.get(symbol) else {
                continue;
            };
            if *released < bars.len() && bars[*released].timestamp == now {
                *released += 1;
            }
        }
        self.cursor += 1;
        DataFeedStatus::Advanced
    }

    fn continue_backtest(&self) -> bool {
        self.cursor < self.timeline.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(symbol: &str, day: u32, close: f64) -> Bar {
        Bar {
            symbol: symbol.into(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    fn two_symbol_feed() -> HistoricBars {
        HistoricBars::from_bars(vec![
            bar("SPY", 1, 100.0),
            bar("SPY", 2, 101.0),
            bar("QQQ", 1, 300.0),
            bar("QQQ", 2, 303.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_empty_universe() {
        assert_eq!(
            HistoricBars::new(BTreeMap::new()).unwrap_err(),
            DataError::NoSymbols
        );
    }

    #[test]
    fn rejects_empty_series() {
        let mut series = BTreeMap::new();
        series.insert("SPY".to_string(), Vec::new());
        assert!(matches!(
            HistoricBars::new(series).unwrap_err(),
            DataError::EmptySeries { .. }
        ));
    }

    #[test]
    fn rejects_out_of_order_series() {
        let mut series = BTreeMap::new();
        series.insert("SPY".to_string(), vec![bar("SPY", 2, 101.0), bar("SPY", 1, 100.0)]);
        assert!(matches!(
            HistoricBars::new(series).unwrap_err(),
            DataError::OutOfOrder { .. }
        ));
    }

    #[test]
    fn rejects_mistagged_bars() {
        let mut series = BTreeMap::new();
        series.insert("SPY".to_string(), vec![bar("QQQ", 1, 300.0)]);
        assert!(matches!(
            HistoricBars::new(series).unwrap_err(),
            DataError::SymbolMismatch { .. }
        ));
    }

    #[test]
    fn no_bars_before_first_update() {
        let feed = two_symbol_feed();
        assert!(matches!(
            feed.latest_bars("SPY", 1).unwrap_err(),
            DataError::NoBars { .. }
        ));
        assert_eq!(feed.latest_timestamp(), None);
    }

    #[test]
    fn update_releases_bars_in_step() {
        let mut feed = two_symbol_feed();
        assert_eq!(feed.update_bars(), DataFeedStatus::Advanced);

        let spy = feed.latest_bars("SPY", 5).unwrap();
        assert_eq!(spy.len(), 1);
        assert_eq!(spy[0].close, 100.0);
        assert_eq!(feed.latest_bar("QQQ").unwrap().close, 300.0);

        assert_eq!(feed.update_bars(), DataFeedStatus::Advanced);
        let spy = feed.latest_bars("SPY", 5).unwrap();
        assert_eq!(spy.len(), 2);
        assert_eq!(spy.last().unwrap().close, 101.0);

        assert_eq!(feed.update_bars(), DataFeedStatus::Exhausted);
        assert!(!feed.continue_backtest());
    }

    #[test]
    fn never_reveals_future_bars() {
        let mut feed = two_symbol_feed();
        feed.update_bars();
        // Ask for far more than released: only the released prefix comes back.
        let spy = feed.latest_bars("SPY", 100).unwrap();
        assert_eq!(spy.len(), 1);
    }

    #[test]
    fn symbol_with_hole_releases_nothing_that_step() {
        // QQQ is missing day 2.
        let mut feed = HistoricBars::from_bars(vec![
            bar("SPY", 1, 100.0),
            bar("SPY", 2, 101.0),
            bar("QQQ", 1, 300.0),
        ])
        .unwrap();

        feed.update_bars();
        feed.update_bars();
        // SPY advanced to day 2; QQQ's latest bar is still day 1.
        assert_eq!(feed.latest_bar("SPY").unwrap().close, 101.0);
        let qqq = feed.latest_bar("QQQ").unwrap();
        assert_eq!(qqq.close, 300.0);
        assert!(qqq.timestamp < feed.latest_timestamp().unwrap());
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let feed = two_symbol_feed();
        assert!(matches!(
            feed.latest_bars("TSLA", 1).unwrap_err(),
            DataError::UnknownSymbol { .. }
        ));
    }
}
