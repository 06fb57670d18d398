//! Bar acquisition for the runner: per-symbol CSV files or a seeded
//! synthetic random walk.
//!
//! Remote data providers are deliberately absent — acquiring and persisting
//! market data is an external concern. What arrives here is already on disk
//! (or generated), and the loader's job is shaping it into sane `Bar`s.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use quantloop_core::domain::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing data file for symbol '{symbol}': {path}")]
    MissingFile { symbol: String, path: PathBuf },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("insane OHLC bar for '{symbol}' on {date}")]
    InsaneBar { symbol: String, date: NaiveDate },
}

/// One CSV row: `date,open,high,low,close,volume`.
#[derive(Debug, Deserialize)]
struct CsvBarRecord {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Load bars for a universe from `<dir>/<SYMBOL>.csv` files.
pub fn load_csv_dir(dir: &Path, symbols: &[String]) -> Result<Vec<Bar>, LoadError> {
    let mut bars = Vec::new();
    for symbol in symbols {
        let path = dir.join(format!("{symbol}.csv"));
        if !path.exists() {
            return Err(LoadError::MissingFile {
                symbol: symbol.clone(),
                path,
            });
        }
        let mut reader = csv::Reader::from_path(&path).map_err(|source| LoadError::Csv {
            path: path.clone(),
            source,
        })?;
        for record in reader.deserialize::<CsvBarRecord>() {
            let record = record.map_err(|source| LoadError::Csv {
                path: path.clone(),
                source,
            })?;
            let bar = Bar {
                symbol: symbol.clone(),
                timestamp: Utc
                    .from_utc_datetime(&record.date.and_hms_opt(0, 0, 0).unwrap_or_default()),
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            };
            if !bar.is_sane() {
                return Err(LoadError::InsaneBar {
                    symbol: symbol.clone(),
                    date: record.date,
                });
            }
            bars.push(bar);
        }
    }
    Ok(bars)
}

/// Seeded random-walk bars, aligned across the universe.
///
/// Each symbol walks under its own BLAKE3-derived sub-seed, so adding a
/// symbol never perturbs the others' paths.
pub fn synthetic_bars(symbols: &[String], bars: usize, seed: u64, start_price: f64) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    let mut out = Vec::with_capacity(symbols.len() * bars);
    for symbol in symbols {
        let mut rng = StdRng::seed_from_u64(sub_seed(seed, symbol));
        let mut close = start_price.max(1.0);
        for step in 0..bars {
            let open = close;
            close = (close * (1.0 + rng.gen_range(-0.02..0.02))).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
            out.push(Bar {
                symbol: symbol.clone(),
                timestamp: start + Duration::days(step as i64),
                open,
                high,
                low,
                close,
                volume: rng.gen_range(10_000..1_000_000),
            });
        }
    }
    out
}

fn sub_seed(master_seed: u64, symbol: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(symbol.as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
