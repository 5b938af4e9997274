//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store_adapter::JsonStoreAdapter;
use crate::domain::bot_config::load_bot_config;
use crate::domain::error::SimError;
use crate::domain::portfolio::Portfolio;
use crate::domain::record::BotRecord;
use crate::domain::universe::validate_universe;
use crate::ports::data_port::PriceDataPort;
use crate::ports::store_port::BotStorePort;

#[derive(Parser, Debug)]
#[command(name = "botsim", about = "Crypto trading bot simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate a bot over a price table
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        prices: PathBuf,
        /// Last day to simulate, defaults to the price table's last date
        #[arg(long)]
        until: Option<NaiveDate>,
        /// Save the simulated bot into this store directory
        #[arg(long)]
        save_to: Option<PathBuf>,
    },
    /// Compare saved bots
    Compare {
        #[arg(short, long)]
        store: PathBuf,
    },
    /// Validate a bot configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show symbols and date range of a price file
    Info {
        #[arg(short, long)]
        prices: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Simulate {
            config,
            prices,
            until,
            save_to,
        } => run_simulate(&config, &prices, until, save_to.as_deref()),
        Command::Compare { store } => run_compare(&store),
        Command::Validate { config } => run_validate(&config),
        Command::Info { prices } => run_info(&prices),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn load_config(path: &Path) -> Result<FileConfigAdapter, SimError> {
    FileConfigAdapter::from_file(path).map_err(|e| SimError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn run_simulate(
    config_path: &Path,
    prices_path: &Path,
    until: Option<NaiveDate>,
    save_to: Option<&Path>,
) -> Result<(), SimError> {
    let config = load_config(config_path)?;
    let bot = load_bot_config(&config)?;

    let adapter = CsvPriceAdapter::new(prices_path.to_path_buf());
    // The full table, not just the simulated range: rolling-window signals
    // look back before the start date.
    let prices = adapter.load_prices(None, None)?;
    let target = until.unwrap_or(prices.last_date());

    // Considered coins the table does not carry are dropped with a warning;
    // funded ones stay and fail construction properly.
    let symbols = bot.allocation.iter().map(|(s, _)| s.clone()).collect();
    let validated = validate_universe(&prices, symbols)?;
    let skipped: HashSet<&str> = validated
        .skipped
        .iter()
        .map(|s| s.symbol.as_str())
        .collect();
    let allocation: Vec<(String, f64)> = bot
        .allocation
        .into_iter()
        .filter(|(symbol, fraction)| *fraction > 0.0 || !skipped.contains(symbol.as_str()))
        .collect();

    let mut portfolio = Portfolio::new(
        &bot.name,
        &allocation,
        bot.start_date,
        bot.start_value,
        &prices,
        bot.strategy,
    )?;
    portfolio.advance(target)?;

    println!("Bot:           {}", portfolio.name());
    println!("Strategy:      {}", portfolio.strategy().describe());
    println!("{}", portfolio.summary());
    println!("Trades:        {}", portfolio.trade_log().len());
    let rejected = portfolio.rejections().total();
    if rejected > 0 {
        println!("Rejected buys: {rejected} (insufficient cash)");
    }

    if let Some(dir) = save_to {
        let store = JsonStoreAdapter::new(dir.to_path_buf());
        store.save(&portfolio.to_record())?;
        println!("Saved {} to {}", portfolio.name(), dir.display());
    }

    Ok(())
}

fn run_compare(store_dir: &Path) -> Result<(), SimError> {
    let store = JsonStoreAdapter::new(store_dir.to_path_buf());
    let names = store.list()?;
    if names.is_empty() {
        println!("No bots stored in {}", store_dir.display());
        return Ok(());
    }

    let mut records = Vec::with_capacity(names.len());
    for name in &names {
        records.push(store.load(name)?);
    }
    records.sort_by(|a: &BotRecord, b: &BotRecord| {
        b.roi()
            .partial_cmp(&a.roi())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>6} {:>10} {:>10}",
        "Bot", "Start", "Current", "Return", "Days", "Annual %", "Vol"
    );
    for record in &records {
        println!(
            "{:<20} {:>12.2} {:>12.2} {:>12.2} {:>6} {:>10.2} {:>10.2}",
            record.name,
            record.start_value,
            record.valuate(),
            record.total_return(),
            record.days_held(),
            record.roi(),
            record.volatility(),
        );
    }

    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SimError> {
    let config = load_config(config_path)?;
    let bot = load_bot_config(&config)?;

    println!("Configuration OK");
    println!("Bot:      {}", bot.name);
    println!("Start:    {} at {}", bot.start_date, bot.start_value);
    println!("Strategy: {}", bot.strategy.describe());
    Ok(())
}

fn run_info(prices_path: &Path) -> Result<(), SimError> {
    let adapter = CsvPriceAdapter::new(prices_path.to_path_buf());
    let table = adapter.load_prices(None, None)?;

    println!("Symbols: {}", table.symbols().join(", "));
    println!(
        "Range:   {} to {} ({} days)",
        table.first_date(),
        table.last_date(),
        table.day_count()
    );
    Ok(())
}
