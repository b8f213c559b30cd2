//! replay CLI: run a backtest over CSV bars.
//!
//! Commands:
//! - `run` - load bars, run the configured strategy, write the equity curve
//! - `config` - print the default configuration as JSON

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use replay_backtest::{write_equity_csv, Backtest, EngineConfig, Portfolio, SimulatedVenue};
use replay_core::config::StrategyConfig;
use replay_core::{Config, Strategy};
use replay_ingestion::load_csv_dir;
use replay_strategies::build_strategy;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "replay", about = "Event-driven backtester over historical bars")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest. Flags override values from the config file.
    Run(RunArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(clap::Args)]
struct RunArgs {
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding one `<SYMBOL>.csv` per instrument.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Instruments to load (comma separated).
    #[arg(long, value_delimiter = ',')]
    symbols: Vec<String>,

    /// First date to include (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Short moving-average window. Selects the crossover strategy.
    #[arg(long)]
    short: Option<usize>,

    /// Long moving-average window. Selects the crossover strategy.
    #[arg(long)]
    long: Option<usize>,

    /// Starting cash.
    #[arg(long)]
    capital: Option<f64>,

    /// Shares per order.
    #[arg(long)]
    lot_size: Option<i64>,

    /// Equity curve CSV destination.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pause between bars in milliseconds.
    #[arg(long)]
    heartbeat_ms: Option<u64>,

    /// Print the report as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run_backtest_cmd(args),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&Config::default())?);
            Ok(())
        }
    }
}

/// Merge the config file and command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<Config> {
    let mut config = match &args.config {
        // Validated after overrides, so a file may leave out e.g. symbols
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(dir) = &args.csv_dir {
        config.data.csv_dir = dir.clone();
    }
    if !args.symbols.is_empty() {
        config.data.symbols = args.symbols.clone();
    }
    if args.start.is_some() {
        config.data.start = args.start;
    }
    if args.end.is_some() {
        config.data.end = args.end;
    }
    if let Some(capital) = args.capital {
        config.portfolio.initial_capital = capital;
    }
    if let Some(lot) = args.lot_size {
        config.portfolio.lot_size = lot;
    }
    if let Some(path) = &args.output {
        config.backtest.equity_csv = Some(path.clone());
    }
    if let Some(ms) = args.heartbeat_ms {
        config.backtest.heartbeat_ms = ms;
    }

    if args.short.is_some() || args.long.is_some() {
        let (default_short, default_long) = match config.strategy {
            StrategyConfig::MovingAverageCross {
                short_window,
                long_window,
            } => (short_window, long_window),
            _ => (100, 400),
        };
        config.strategy = StrategyConfig::MovingAverageCross {
            short_window: args.short.unwrap_or(default_short),
            long_window: args.long.unwrap_or(default_long),
        };
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run_backtest_cmd(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let source = load_csv_dir(
        &config.data.csv_dir,
        &config.data.symbols,
        config.data.start,
        config.data.end,
    )
    .with_context(|| format!("loading bars from {}", config.data.csv_dir.display()))?;
    let symbols = config.data.symbols.clone();

    let strategy = build_strategy(&config.strategy, &symbols);
    let venue = SimulatedVenue::from_config(&config.execution);
    let portfolio = Portfolio::from_config(symbols.clone(), &config.portfolio);

    info!(strategy = strategy.name(), venue = venue.name(), "starting run");
    let outcome = Backtest::new(source, strategy, venue, portfolio)
        .with_config(EngineConfig::from(&config.backtest))
        .run()
        .context("backtest failed")?;

    if let Some(path) = &config.backtest.equity_csv {
        write_equity_csv(path, &outcome.curve, &symbols)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let positions: Vec<(String, i64)> = outcome
        .portfolio
        .positions()
        .map(|(symbol, quantity)| (symbol.to_string(), quantity))
        .collect();

    if args.json {
        let body = serde_json::json!({
            "report": outcome.report,
            "stats": outcome.stats,
            "positions": positions,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    for (label, value) in outcome.summary() {
        println!("{label:<20} {value}");
    }
    println!("{:<20} {}", "Signals", outcome.stats.signals);
    println!("{:<20} {}", "Orders", outcome.stats.orders);
    println!("{:<20} {}", "Fills", outcome.stats.fills);
    for (symbol, quantity) in &positions {
        println!("{:<20} {}", format!("Position {symbol}"), quantity);
    }
    Ok(())
}
