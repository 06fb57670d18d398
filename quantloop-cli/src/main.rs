//! Quantloop CLI — run event-driven backtests.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config file, or from inline
//!   flags over synthetic data (handy for smoke runs)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use quantloop_runner::config::{BacktestConfig, DataConfig, StrategyConfig};
use quantloop_runner::runner::{run_single_backtest, BacktestResult};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quantloop", about = "Quantloop CLI — event-driven backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or inline flags.
    Run {
        /// Path to a TOML config file. Mutually exclusive with the inline flags.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols for an inline synthetic run (e.g., SPY QQQ).
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Starting capital.
        #[arg(long, default_value_t = 100_000.0)]
        capital: f64,

        /// Number of synthetic bars.
        #[arg(long, default_value_t = 252)]
        bars: usize,

        /// Master seed for synthetic data and the random strategy.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Strategy: buy_and_hold or random_forecast.
        #[arg(long, default_value = "buy_and_hold")]
        strategy: String,

        /// Write the full result artifact as JSON to this path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            symbols,
            capital,
            bars,
            seed,
            strategy,
            output,
        } => run_cmd(config, symbols, capital, bars, seed, &strategy, output),
    }
}

fn run_cmd(
    config_path: Option<PathBuf>,
    symbols: Vec<String>,
    capital: f64,
    bars: usize,
    seed: u64,
    strategy: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    if config_path.is_some() && !symbols.is_empty() {
        bail!("--config and --symbols are mutually exclusive");
    }

    let config = if let Some(path) = config_path {
        BacktestConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?
    } else {
        if symbols.is_empty() {
            bail!("one of --config or --symbols is required");
        }
        let strategy = match strategy {
            "buy_and_hold" => StrategyConfig::BuyAndHold,
            "random_forecast" => StrategyConfig::RandomForecast { seed },
            other => bail!("unknown strategy '{other}'. Valid: buy_and_hold, random_forecast"),
        };
        BacktestConfig {
            symbols,
            initial_capital: capital,
            strategy,
            commission: Default::default(),
            commission_fallback: Default::default(),
            gap_policy: Default::default(),
            data: DataConfig::Synthetic {
                bars,
                seed,
                start_price: 100.0,
            },
        }
    };

    let result = run_single_backtest(&config).context("backtest failed")?;
    print_summary(&result);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing result to {}", path.display()))?;
        println!("Result saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let report = &result.report;
    println!();
    println!("=== Backtest Result ===");
    println!("Run id:         {}", &result.run_id[..16.min(result.run_id.len())]);
    println!("Strategy:       {}", report.strategy);
    println!("Symbols:        {}", result.config.symbols.join(" "));
    println!("Bars:           {}", report.bars_processed);
    println!(
        "Events:         {} signals, {} orders, {} fills",
        report.signals, report.orders, report.fills
    );
    println!();
    println!("--- Performance ---");
    println!("Total Return:   {:.2}%", result.metrics.total_return * 100.0);
    println!("Sharpe:         {:.3}", result.metrics.sharpe);
    println!("Max Drawdown:   {:.2}%", result.metrics.max_drawdown * 100.0);
    println!("DD Duration:    {} bars", result.metrics.drawdown_duration);
    if let Some(final_holdings) = report.holdings_history.last() {
        println!("Final Equity:   {:.2}", final_holdings.total);
        println!("Commission:     {:.2}", final_holdings.commission);
    }
    println!();
}
