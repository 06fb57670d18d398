//! Pluggable commission models.

use crate::events::OrderEvent;

/// Computes the commission for an order at execution time. Always ≥ 0.
pub trait CommissionModel {
    fn name(&self) -> &str;

    fn commission(&self, order: &OrderEvent) -> f64;
}

/// Fixed amount per unit traded.
#[derive(Debug, Clone)]
pub struct PerShareCommission {
    amount: f64,
}

impl PerShareCommission {
    pub fn new(amount: f64) -> Self {
        Self {
            amount: amount.max(0.0),
        }
    }
}

impl CommissionModel for PerShareCommission {
    fn name(&self) -> &str {
        "PerShare"
    }

    fn commission(&self, order: &OrderEvent) -> f64 {
        self.amount * order.quantity() as f64
    }
}

/// Flat amount per trade, independent of size.
#[derive(Debug, Clone)]
pub struct PerTradeCommission {
    amount: f64,
}

impl PerTradeCommission {
    pub fn new(amount: f64) -> Self {
        Self {
            amount: amount.max(0.0),
        }
    }
}

impl CommissionModel for PerTradeCommission {
    fn name(&self) -> &str {
        "PerTrade"
    }

    fn commission(&self, _order: &OrderEvent) -> f64 {
        self.amount
    }
}
