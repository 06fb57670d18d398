//! Random long/short forecasts — nonsensical as a strategy, ideal for
//! demonstrating the backtesting infrastructure.
//!
//! Each symbol gets its own RNG seeded by a BLAKE3-derived sub-seed of the
//! master seed, so results are identical regardless of the order in which
//! symbols are processed and fully reproducible from the master seed alone.

use crate::data::MarketData;
use crate::events::{SignalDirection, SignalEvent};
use crate::strategy::Strategy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Bars to stay silent on per symbol before the first forecast, which keeps
/// the earliest (least informed) region of the data out of the trade log.
const WARMUP_BARS: usize = 5;

/// Coin-flip long/short signal per symbol per bar, after a short warmup.
#[derive(Debug, Clone)]
pub struct RandomForecastStrategy {
    master_seed: u64,
    rngs: BTreeMap<String, StdRng>,
}

impl RandomForecastStrategy {
    pub fn new(symbols: &[String], master_seed: u64) -> Self {
        let rngs = symbols
            .iter()
            .map(|s| (s.clone(), StdRng::seed_from_u64(sub_seed(master_seed, s))))
            .collect();
        Self { master_seed, rngs }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }
}

/// Order-independent per-symbol seed derivation.
fn sub_seed(master_seed: u64, symbol: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(symbol.as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

impl Strategy for RandomForecastStrategy {
    fn name(&self) -> &str {
        "RandomForecast"
    }

    fn generate_signals(&mut self, data: &dyn MarketData) -> Vec<SignalEvent> {
        let now = match data.latest_timestamp() {
            Some(ts) => ts,
            None => return Vec::new(),
        };

        let mut signals = Vec::new();
        for (symbol, rng) in self.rngs.iter_mut() {
            // Only symbols with a fresh bar this step get a forecast.
            let Ok(bars) = data.latest_bars(symbol, WARMUP_BARS + 1) else {
                continue;
            };
            let Some(latest) = bars.last() else {
                continue;
            };
            if latest.timestamp != now || bars.len() <= WARMUP_BARS {
                continue;
            }
            let direction = if rng.gen_bool(0.5) {
                SignalDirection::Long
            } else {
                SignalDirection::Short
            };
            signals.push(SignalEvent::full(symbol.clone(), direction));
        }
        signals
    }
}
