//! Replay determinism: identical inputs must produce byte-identical results.

use quantloop_runner::config::{BacktestConfig, DataConfig, StrategyConfig};
use quantloop_runner::runner::run_single_backtest;

fn config(strategy: StrategyConfig) -> BacktestConfig {
    BacktestConfig {
        symbols: vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()],
        initial_capital: 100_000.0,
        strategy,
        commission: Default::default(),
        commission_fallback: Default::default(),
        gap_policy: Default::default(),
        data: DataConfig::Synthetic {
            bars: 120,
            seed: 42,
            start_price: 100.0,
        },
    }
}

#[test]
fn buy_and_hold_replay_is_byte_identical() {
    let cfg = config(StrategyConfig::BuyAndHold);
    let a = run_single_backtest(&cfg).unwrap();
    let b = run_single_backtest(&cfg).unwrap();

    assert_eq!(
        serde_json::to_string(&a.report.equity_curve).unwrap(),
        serde_json::to_string(&b.report.equity_curve).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&a.report.holdings_history).unwrap(),
        serde_json::to_string(&b.report.holdings_history).unwrap()
    );
    assert_eq!(a.run_id, b.run_id);
}

#[test]
fn random_forecast_replay_is_byte_identical() {
    let cfg = config(StrategyConfig::RandomForecast { seed: 7 });
    let a = run_single_backtest(&cfg).unwrap();
    let b = run_single_backtest(&cfg).unwrap();

    assert_eq!(
        serde_json::to_string(&a.report.trace).unwrap(),
        serde_json::to_string(&b.report.trace).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&a.report.equity_curve).unwrap(),
        serde_json::to_string(&b.report.equity_curve).unwrap()
    );
}

#[test]
fn different_seeds_diverge() {
    let a = run_single_backtest(&config(StrategyConfig::RandomForecast { seed: 7 })).unwrap();
    let b = run_single_backtest(&config(StrategyConfig::RandomForecast { seed: 8 })).unwrap();

    assert_ne!(a.run_id, b.run_id);
    assert_ne!(
        serde_json::to_string(&a.report.trace).unwrap(),
        serde_json::to_string(&b.report.trace).unwrap()
    );
}

#[test]
fn ledger_identity_holds_for_every_run() {
    for seed in [1, 2, 3] {
        let result =
            run_single_backtest(&config(StrategyConfig::RandomForecast { seed })).unwrap();
        for snap in &result.report.holdings_history {
            let mv: f64 = snap.market_value.values().sum();
            assert!(
                (snap.total - (snap.cash + mv)).abs() < 1e-9,
                "seed {seed}: identity broken at {}",
                snap.timestamp
            );
        }
    }
}
