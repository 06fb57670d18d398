//! Buy-and-hold: go long each symbol once and never touch it again.
//!
//! The simplest possible strategy, useful as a baseline and for exercising
//! the full event path with a deterministic, easily-checked trace.

use crate::data::MarketData;
use crate::events::{SignalDirection, SignalEvent};
use crate::strategy::Strategy;
use std::collections::BTreeSet;

/// Emits a single full-strength LONG per symbol the first time that symbol
/// has a bar, then stays silent.
#[derive(Debug, Clone, Default)]
pub struct BuyAndHoldStrategy {
    bought: BTreeSet<String>,
}

impl BuyAndHoldStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        "BuyAndHold"
    }

    fn generate_signals(&mut self, data: &dyn MarketData) -> Vec<SignalEvent> {
        let mut signals = Vec::new();
        for symbol in data.symbols() {
            if self.bought.contains(symbol) {
                continue;
            }
            if data.latest_bar(symbol).is_ok() {
                signals.push(SignalEvent::full(symbol.clone(), SignalDirection::Long));
                self.bought.insert(symbol.clone());
            }
        }
        signals
    }
}
