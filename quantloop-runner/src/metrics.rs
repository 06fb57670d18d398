//! Performance metrics — pure functions over the finished equity curve.
//!
//! Every metric is equity series in, scalar out: no dependency on the
//! engine, the queue, or any run state. These consume the `total` series
//! the portfolio's holdings history produces.

use serde::{Deserialize, Serialize};

/// Summary statistics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub drawdown_duration: usize,
}

impl PerformanceSummary {
    /// Compute all metrics from the total-equity series.
    pub fn compute(equity_curve: &[f64]) -> Self {
        Self {
            total_return: total_return(equity_curve),
            sharpe: sharpe_ratio(equity_curve, 0.0),
            max_drawdown: max_drawdown(equity_curve),
            drawdown_duration: drawdown_duration(equity_curve),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let initial = equity_curve[0];
    let Some(&final_eq) = equity_curve.last() else {
        return 0.0;
    };
    if initial <= 0.0 {
        return 0.0;
    }
    (final_eq - initial) / initial
}

/// Annualized Sharpe ratio from per-bar returns.
///
/// Sharpe = mean(returns - rf) / std(returns) * sqrt(252).
/// Returns 0.0 if variance is zero or fewer than 2 bars.
pub fn sharpe_ratio(equity_curve: &[f64], risk_free_rate: f64) -> f64 {
    let returns = bar_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let bar_rf = risk_free_rate / 252.0;
    let excess: Vec<f64> = returns.iter().map(|r| r - bar_rf).collect();
    let mean = mean_f64(&excess);
    let std = std_dev(&excess);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * (252.0_f64).sqrt()
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 for constant or monotonically increasing equity.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Longest drawdown in bars: the longest stretch spent below a running
/// peak before recovering to it.
pub fn drawdown_duration(equity_curve: &[f64]) -> usize {
    if equity_curve.len() < 2 {
        return 0;
    }
    let mut peak = equity_curve[0];
    let mut current = 0;
    let mut longest = 0;

    for &eq in &equity_curve[1..] {
        if eq >= peak {
            peak = eq;
            current = 0;
        } else {
            current += 1;
            if current > longest {
                longest = current;
            }
        }
    }
    longest
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Per-bar percentage returns from an equity series.
pub fn bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    if equity_curve.len() < 2 {
        return Vec::new();
    }
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
