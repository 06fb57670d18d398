//! Equity-curve derivation — pure and stateless over the holdings history.

use crate::portfolio::ledger::HoldingsSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One point on the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    /// Total equity (cash + marked positions) at this bar.
    pub total: f64,
    /// Percentage change of `total` versus the previous bar.
    pub returns: f64,
    /// Running product of `(1 + returns)` — the equity multiplier.
    pub equity: f64,
}

/// Chronological curve of total equity with per-bar returns and the
/// cumulative multiplier.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
}

impl EquityCurve {
    /// Derive the curve from a completed holdings history.
    pub fn from_holdings(history: &[HoldingsSnapshot]) -> Self {
        let mut points: Vec<EquityPoint> = Vec::with_capacity(history.len());
        for snap in history {
            let (returns, equity) = match points.last() {
                None => (0.0, 1.0),
                Some(prev) => {
                    let r = if prev.total != 0.0 {
                        (snap.total - prev.total) / prev.total
                    } else {
                        0.0
                    };
                    (r, prev.equity * (1.0 + r))
                }
            };
            points.push(EquityPoint {
                timestamp: snap.timestamp,
                total: snap.total,
                returns,
                equity,
            });
        }
        Self { points }
    }

    /// The raw total-equity series, for the performance collaborators.
    pub fn totals(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total).collect()
    }

    /// Final equity multiplier, 1.0 for an empty or single-point curve.
    pub fn final_equity(&self) -> f64 {
        self.points.last().map(|p| p.equity).unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn snap(day: u32, total: f64) -> HoldingsSnapshot {
        HoldingsSnapshot {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            market_value: BTreeMap::new(),
            cash: total,
            commission: 0.0,
            total,
        }
    }

    #[test]
    fn curve_from_known_totals() {
        let history = vec![snap(1, 100_000.0), snap(2, 110_000.0), snap(3, 99_000.0)];
        let curve = EquityCurve::from_holdings(&history);

        assert_eq!(curve.len(), 3);
        assert_eq!(curve.points[0].returns, 0.0);
        assert_eq!(curve.points[0].equity, 1.0);
        assert!((curve.points[1].returns - 0.1).abs() < 1e-12);
        assert!((curve.points[1].equity - 1.1).abs() < 1e-12);
        assert!((curve.points[2].returns - (-0.1)).abs() < 1e-12);
        assert!((curve.final_equity() - 0.99).abs() < 1e-12);
    }

    #[test]
    fn constant_totals_give_unit_multiplier() {
        let history = vec![snap(1, 50_000.0), snap(2, 50_000.0), snap(3, 50_000.0)];
        let curve = EquityCurve::from_holdings(&history);
        assert!(curve.points.iter().all(|p| p.returns == 0.0 && p.equity == 1.0));
    }

    #[test]
    fn empty_history_gives_empty_curve() {
        let curve = EquityCurve::from_holdings(&[]);
        assert!(curve.is_empty());
        assert_eq!(curve.final_equity(), 1.0);
    }

    #[test]
    fn zero_total_does_not_divide_by_zero() {
        let history = vec![snap(1, 0.0), snap(2, 100.0)];
        let curve = EquityCurve::from_holdings(&history);
        assert_eq!(curve.points[1].returns, 0.0);
        assert!(curve.points[1].equity.is_finite());
    }
}
