//! Painel CLI — market-data pipeline commands.
//!
//! Commands:
//! - `quote` — fetch daily bars for a symbol and export them as CSV
//! - `indicators` — compute the full indicator table for a symbol
//! - `monthly` — per-month extremes, mean close, and min-day frequency
//! - `compare` — rank several symbols by latest momentum
//! - `flow` — extract the B3 investor-flow table (daily or cumulative)
//! - `search` — free-text symbol search
//! - `tickers` — manage the saved-tickers watchlist

mod config;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use config::Config;
use painel_core::data::{
    fetch_many, search_symbols, QuoteCache, QuoteProvider, StdoutProgress, YahooQuotes,
};
use painel_core::export::{
    bars_csv, day_frequency_csv, flow_csv, indicator_csv, monthly_csv,
};
use painel_core::flow::{extract_flow_table, fetch_flow_page};
use painel_core::indicators::{indicator_table, rank_latest_momentum, IndicatorParams};
use painel_core::monthly::{min_day_frequency, monthly_summaries};
use painel_core::store::{AddOutcome, TickerEntry, TickerStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "painel", about = "Painel CLI — B3 market-data pipeline")]
struct Cli {
    /// Optional TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily bars for a symbol and export them as CSV.
    Quote {
        /// Symbol, e.g. PETR4.SA.
        symbol: String,

        /// Start date (YYYY-MM-DD). Defaults to 1 year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Trailing period ("1mo", "6mo", "1y", ...) instead of explicit dates.
        #[arg(long, conflicts_with_all = ["start", "end"])]
        lookback: Option<String>,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compute the indicator table (moving averages, RSI, MACD, volatility, momentum).
    Indicators {
        /// Symbol, e.g. PETR4.SA.
        symbol: String,

        /// Start date (YYYY-MM-DD). Defaults to 1 year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Short moving-average window.
        #[arg(long, default_value_t = 20)]
        short_window: usize,

        /// Long moving-average window.
        #[arg(long, default_value_t = 50)]
        long_window: usize,

        /// Momentum window.
        #[arg(long, default_value_t = 14)]
        momentum_window: usize,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Per-month price extremes and the day-of-month minimum frequency.
    Monthly {
        /// Symbol, e.g. PETR4.SA.
        symbol: String,

        /// Start date (YYYY-MM-DD). Defaults to 1 year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Export the min-day frequency table instead of the summaries.
        #[arg(long, default_value_t = false)]
        days: bool,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Rank several symbols by their most recent momentum.
    Compare {
        /// Symbols to compare (e.g. PETR4.SA VALE3.SA ITUB4.SA).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 1 year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Momentum window.
        #[arg(long, default_value_t = 14)]
        window: usize,
    },
    /// Extract the B3 investor-flow table.
    Flow {
        /// Export cumulative flows instead of daily values.
        #[arg(long, default_value_t = false)]
        cumulative: bool,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Search symbols by company name or partial ticker.
    Search {
        /// Free-text query, e.g. "petrobras".
        query: String,

        /// Maximum number of results.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Manage the saved-tickers watchlist.
    Tickers {
        #[command(subcommand)]
        action: TickerAction,
    },
}

#[derive(Subcommand)]
enum TickerAction {
    /// List saved tickers.
    List,
    /// Save a ticker. Company name and exchange are looked up when omitted.
    Add {
        /// Symbol, e.g. PETR4.SA.
        ticker: String,

        /// Company name. Looked up via symbol search when omitted.
        #[arg(long)]
        company: Option<String>,

        /// Exchange code. Looked up via symbol search when omitted.
        #[arg(long)]
        exchange: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Quote {
            symbol,
            start,
            end,
            lookback,
            output,
        } => run_quote(&symbol, start, end, lookback, output),
        Commands::Indicators {
            symbol,
            start,
            end,
            short_window,
            long_window,
            momentum_window,
            output,
        } => run_indicators(
            &symbol,
            start,
            end,
            IndicatorParams {
                short_window,
                long_window,
                momentum_window,
            },
            output,
        ),
        Commands::Monthly {
            symbol,
            start,
            end,
            days,
            output,
        } => run_monthly(&symbol, start, end, days, output),
        Commands::Compare {
            symbols,
            start,
            end,
            window,
        } => run_compare(&symbols, start, end, window),
        Commands::Flow { cumulative, output } => run_flow(&config.flow_url, cumulative, output),
        Commands::Search { query, limit } => run_search(&query, limit),
        Commands::Tickers { action } => match action {
            TickerAction::List => run_tickers_list(&config),
            TickerAction::Add {
                ticker,
                company,
                exchange,
            } => run_tickers_add(&config, &ticker, company, exchange),
        },
    }
}

fn parse_range(start: Option<String>, end: Option<String>) -> Result<(NaiveDate, NaiveDate)> {
    let end_date = end
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("invalid --end date")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let start_date = start
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("invalid --start date")?
        .unwrap_or_else(|| end_date - chrono::Duration::days(365));

    if start_date > end_date {
        bail!("start date {start_date} is after end date {end_date}");
    }
    Ok((start_date, end_date))
}

fn emit(csv: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Written: {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn fetch_bars(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<painel_core::domain::Bar>> {
    let provider = YahooQuotes::new();
    let bars = provider
        .fetch(symbol, start, end)
        .with_context(|| format!("failed to fetch {symbol}"))?;
    Ok(bars)
}

fn run_quote(
    symbol: &str,
    start: Option<String>,
    end: Option<String>,
    lookback: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let bars = if let Some(lookback) = lookback {
        YahooQuotes::new()
            .fetch_lookback(symbol, &lookback)
            .with_context(|| format!("failed to fetch {symbol}"))?
    } else {
        let (start, end) = parse_range(start, end)?;
        fetch_bars(symbol, start, end)?
    };
    emit(&bars_csv(&bars)?, output)
}

fn run_indicators(
    symbol: &str,
    start: Option<String>,
    end: Option<String>,
    params: IndicatorParams,
    output: Option<PathBuf>,
) -> Result<()> {
    let (start, end) = parse_range(start, end)?;
    let bars = fetch_bars(symbol, start, end)?;
    let rows = indicator_table(&bars, &params);
    emit(&indicator_csv(&rows)?, output)
}

fn run_monthly(
    symbol: &str,
    start: Option<String>,
    end: Option<String>,
    days: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let (start, end) = parse_range(start, end)?;
    let bars = fetch_bars(symbol, start, end)?;
    let summaries = monthly_summaries(&bars);

    if days {
        let frequencies = min_day_frequency(&summaries);
        emit(&day_frequency_csv(&frequencies)?, output)
    } else {
        emit(&monthly_csv(&summaries)?, output)
    }
}

fn run_compare(
    symbols: &[String],
    start: Option<String>,
    end: Option<String>,
    window: usize,
) -> Result<()> {
    let (start, end) = parse_range(start, end)?;
    let provider = YahooQuotes::new();
    let mut cache = QuoteCache::new();

    let summary = fetch_many(&provider, &mut cache, symbols, start, end, &StdoutProgress);
    if summary.series.is_empty() {
        bail!("no symbols could be fetched");
    }

    let ranked = rank_latest_momentum(&summary.series, window);
    println!();
    println!("{:<12} {:>12}", "Symbol", "Momentum");
    println!("{}", "-".repeat(25));
    for (symbol, momentum) in &ranked {
        println!("{symbol:<12} {momentum:>12.2}");
    }
    Ok(())
}

fn run_flow(url: &str, cumulative: bool, output: Option<PathBuf>) -> Result<()> {
    let html = fetch_flow_page(url)?;
    let table = extract_flow_table(&html)?;
    if table.skipped_rows > 0 {
        eprintln!(
            "Warning: {} row(s) dropped (unrecognized date or row width)",
            table.skipped_rows
        );
    }
    let table = if cumulative { table.cumulative() } else { table };

    if cumulative {
        println!("Cumulative flow by category (latest row):");
        for (category, value) in table.latest_ranking() {
            println!("  {category:<20} {value:>12.1}");
        }
        println!();
    }
    emit(&flow_csv(&table)?, output)
}

fn run_search(query: &str, limit: usize) -> Result<()> {
    let hits = search_symbols(query, limit)?;
    if hits.is_empty() {
        println!("No symbols found for '{query}'.");
        return Ok(());
    }

    println!("{:<12} {:<40} {:<8}", "Symbol", "Name", "Exchange");
    println!("{}", "-".repeat(62));
    for hit in &hits {
        println!("{:<12} {:<40} {:<8}", hit.symbol, hit.name, hit.exchange);
    }
    Ok(())
}

fn run_tickers_list(config: &Config) -> Result<()> {
    let store = TickerStore::load(&config.store_path)?;
    if store.entries().is_empty() {
        println!("No saved tickers ({}).", store.path().display());
        return Ok(());
    }

    println!("{:<12} {:<40} {:<8}", "Ticker", "Company", "Exchange");
    println!("{}", "-".repeat(62));
    for entry in store.entries() {
        println!(
            "{:<12} {:<40} {:<8}",
            entry.ticker, entry.company, entry.exchange
        );
    }
    Ok(())
}

fn run_tickers_add(
    config: &Config,
    ticker: &str,
    company: Option<String>,
    exchange: Option<String>,
) -> Result<()> {
    let mut store = TickerStore::load(&config.store_path)?;
    if store.contains(ticker) {
        println!("Already saved: {ticker}");
        return Ok(());
    }

    // Fill missing fields from a symbol search before saving.
    let (company, exchange) = match (company, exchange) {
        (Some(c), Some(e)) => (c, e),
        (company, exchange) => {
            let hit = search_symbols(ticker, 1)?
                .into_iter()
                .next()
                .with_context(|| format!("no search result for {ticker}; pass --company and --exchange"))?;
            (
                company.unwrap_or(hit.name),
                exchange.unwrap_or(hit.exchange),
            )
        }
    };

    let outcome = store.add(TickerEntry {
        company,
        ticker: ticker.to_string(),
        exchange,
    })?;

    match outcome {
        AddOutcome::Added => println!("Saved: {ticker} -> {}", store.path().display()),
        AddOutcome::Duplicate => println!("Already saved: {ticker}"),
    }
    Ok(())
}
