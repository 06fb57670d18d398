//! End-to-end scenarios through the full dispatch loop.

use chrono::{TimeZone, Utc};
use quantloop_core::data::{HistoricBars, MarketData};
use quantloop_core::domain::Bar;
use quantloop_core::engine::{Backtest, BacktestReport};
use quantloop_core::events::{Event, SignalDirection, SignalEvent};
use quantloop_core::execution::SimulatedExecutionHandler;
use quantloop_core::portfolio::NaivePortfolio;
use quantloop_core::strategy::{BuyAndHoldStrategy, RandomForecastStrategy, Strategy};
use std::collections::BTreeMap;
use std::collections::VecDeque;

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

/// Emits a pre-written list of signals, one batch per bar, then stays silent.
struct ScriptedStrategy {
    script: VecDeque<Vec<SignalEvent>>,
}

impl ScriptedStrategy {
    fn new(script: Vec<Vec<SignalEvent>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn generate_signals(&mut self, _data: &dyn MarketData) -> Vec<SignalEvent> {
        self.script.pop_front().unwrap_or_default()
    }
}

fn run(bars: Vec<Bar>, strategy: Box<dyn Strategy>) -> BacktestReport {
    let feed = HistoricBars::from_bars(bars).unwrap();
    let symbols: Vec<String> = feed.symbols().to_vec();
    let start = feed.start_timestamp().unwrap();
    let portfolio = NaivePortfolio::new(&symbols, start, 100_000.0).unwrap();

    Backtest::new(
        Box::new(feed),
        strategy,
        Box::new(portfolio),
        Box::new(SimulatedExecutionHandler::new()),
    )
    .run()
    .unwrap()
}

fn aligned_bars(symbols: &[&str], days: u32) -> Vec<Bar> {
    let mut bars = Vec::new();
    for (i, symbol) in symbols.iter().enumerate() {
        for day in 1..=days {
            bars.push(bar(symbol, day, 100.0 + i as f64 * 50.0 + day as f64));
        }
    }
    bars
}

#[test]
fn causal_ordering_holds_in_trace() {
    let report = run(
        aligned_bars(&["AAA", "BBB"], 10),
        Box::new(RandomForecastStrategy::new(
            &["AAA".to_string(), "BBB".to_string()],
            42,
        )),
    );

    let mut signals: BTreeMap<&str, usize> = BTreeMap::new();
    let mut orders: BTreeMap<&str, usize> = BTreeMap::new();
    let mut fills: BTreeMap<&str, usize> = BTreeMap::new();

    for event in &report.trace {
        match event {
            Event::Market => {}
            Event::Signal(s) => *signals.entry(s.symbol()).or_default() += 1,
            Event::Order(o) => {
                let sym = o.symbol();
                *orders.entry(sym).or_default() += 1;
                // Every order is causally derived from a preceding signal.
                assert!(
                    orders[sym] <= *signals.get(sym).unwrap_or(&0),
                    "order without preceding signal for {sym}"
                );
            }
            Event::Fill(f) => {
                let sym = f.symbol();
                *fills.entry(sym).or_default() += 1;
                // Every fill is causally derived from a preceding order.
                assert!(
                    fills[sym] <= *orders.get(sym).unwrap_or(&0),
                    "fill without preceding order for {sym}"
                );
            }
        }
    }

    // 1:1 order → fill at end of run.
    assert_eq!(orders, fills);
    assert_eq!(report.fills, report.orders);
}

#[test]
fn sizing_round_trip_through_engine() {
    // A 0.37-strength LONG at flat must produce exactly one BUY for 37.
    let signal = SignalEvent::new("X", SignalDirection::Long, 0.37).unwrap();
    let report = run(
        aligned_bars(&["X"], 2),
        Box::new(ScriptedStrategy::new(vec![vec![signal]])),
    );

    let order_quantities: Vec<u64> = report
        .trace
        .iter()
        .filter_map(|e| match e {
            Event::Order(o) => Some(o.quantity()),
            _ => None,
        })
        .collect();
    assert_eq!(order_quantities, vec![37]);
}

#[test]
fn exit_signal_flattens_position() {
    // Bar 1: go long 50. Bar 2: exit. Bar 3: nothing.
    let entry = SignalEvent::new("X", SignalDirection::Long, 0.5).unwrap();
    let exit = SignalEvent::full("X", SignalDirection::Exit);
    let report = run(
        aligned_bars(&["X"], 3),
        Box::new(ScriptedStrategy::new(vec![vec![entry], vec![exit]])),
    );

    assert_eq!(report.orders, 2);
    assert_eq!(report.fills, 2);

    // The exit order sells the full 50.
    let last_order = report
        .trace
        .iter()
        .filter_map(|e| match e {
            Event::Order(o) => Some(o),
            _ => None,
        })
        .last()
        .unwrap();
    assert_eq!(last_order.quantity(), 50);

    // Flat again in the final snapshot.
    let final_positions = &report.positions_history.last().unwrap().positions;
    assert_eq!(final_positions["X"], 0);
}

#[test]
fn noop_signals_produce_no_orders() {
    // LONG while already long, then EXIT while flat: neither orders.
    let long1 = SignalEvent::full("X", SignalDirection::Long);
    let long2 = SignalEvent::full("X", SignalDirection::Long);
    let exit_then = SignalEvent::full("X", SignalDirection::Exit);
    let exit_flat = SignalEvent::full("X", SignalDirection::Exit);
    let report = run(
        aligned_bars(&["X"], 5),
        Box::new(ScriptedStrategy::new(vec![
            vec![long1],
            vec![long2],
            vec![exit_then],
            vec![exit_flat],
        ])),
    );

    // 4 signals, but only the first long and the first exit trade.
    assert_eq!(report.signals, 4);
    assert_eq!(report.orders, 2);
    assert_eq!(report.fills, 2);
}

#[test]
fn ledger_conservation_across_full_run() {
    let report = run(
        aligned_bars(&["AAA", "BBB", "CCC"], 20),
        Box::new(RandomForecastStrategy::new(
            &["AAA".to_string(), "BBB".to_string(), "CCC".to_string()],
            9,
        )),
    );

    for snap in &report.holdings_history {
        let mv: f64 = snap.market_value.values().sum();
        assert!(
            (snap.total - (snap.cash + mv)).abs() < 1e-9,
            "ledger identity broken at {}",
            snap.timestamp
        );
    }
}

#[test]
fn full_run_determinism() {
    let run_once = || {
        run(
            aligned_bars(&["AAA", "BBB"], 30),
            Box::new(RandomForecastStrategy::new(
                &["AAA".to_string(), "BBB".to_string()],
                1234,
            )),
        )
    };

    let a = run_once();
    let b = run_once();

    // Byte-identical equity curves, not merely approximately equal.
    let json_a = serde_json::to_string(&a.equity_curve).unwrap();
    let json_b = serde_json::to_string(&b.equity_curve).unwrap();
    assert_eq!(json_a, json_b);

    // And identical traces.
    assert_eq!(
        serde_json::to_string(&a.trace).unwrap(),
        serde_json::to_string(&b.trace).unwrap()
    );
}

#[test]
fn buy_and_hold_never_trades_twice() {
    let report = run(
        aligned_bars(&["AAA", "BBB"], 15),
        Box::new(BuyAndHoldStrategy::new()),
    );
    assert_eq!(report.signals, 2);
    assert_eq!(report.orders, 2);
    assert_eq!(report.fills, 2);

    let final_positions = &report.positions_history.last().unwrap().positions;
    assert!(final_positions.values().all(|&q| q == 100));
}
