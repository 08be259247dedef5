use analytics::{AnalyticsEngine, StationarityReport};
use anyhow::{Context, bail};
use api_client::{ApiClient, BinanceClient};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use configuration::{Config, load_config};
use core_types::{Kline, MissingPolicy, PriceField, PriceRecord, PriceTable, Series, Transform};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

mod render;

/// The main entry point for the driftscope application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; it only supplies DRIFTSCOPE__* overrides and RUST_LOG.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&config.logging, cli.verbose)
        .context("Failed to initialise logging")?;

    match cli.command {
        Commands::Fetch(args) => handle_fetch(args, &mut config).await,
        Commands::Describe(args) => handle_describe(args, &mut config),
        Commands::Analyze(args) => handle_analyze(args, &mut config),
        Commands::Export(args) => handle_export(args, &mut config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Stationarity analysis of daily crypto price histories.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults to ./driftscope.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise the log level (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the daily price history of a symbol into a CSV file.
    Fetch(FetchArgs),
    /// Load a CSV and report its data quality and summary statistics.
    Describe(InputArgs),
    /// Run the stationarity analysis on one column.
    Analyze(AnalyzeArgs),
    /// Write the level and its transforms to a CSV file for external plotting.
    Export(ExportArgs),
}

#[derive(Parser)]
struct FetchArgs {
    /// The symbol to download (e.g., "BTCUSDT"). Defaults to `data.symbol`.
    #[arg(long)]
    symbol: Option<String>,

    /// The first trading date to download (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// The last trading date to download (format: YYYY-MM-DD). Defaults to yesterday, the
    /// last day whose candle has closed.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Destination CSV. Defaults to `data.input`.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser)]
struct InputArgs {
    /// The price CSV. Defaults to `data.input`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Symbol label for the loaded data. Defaults to `data.symbol`.
    #[arg(long)]
    symbol: Option<String>,
}

#[derive(Parser)]
struct AnalyzeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// The column to analyse.
    #[arg(long, value_enum)]
    field: Option<PriceField>,

    /// Largest ACF/PACF lag.
    #[arg(long)]
    max_lag: Option<usize>,

    /// Moving-average window.
    #[arg(long)]
    sma_window: Option<usize>,

    /// How rows without a value in the column are treated.
    #[arg(long, value_enum)]
    missing: Option<MissingPolicy>,

    /// Print the report as JSON instead of tables and charts.
    #[arg(long)]
    json: bool,

    /// Skip the text charts.
    #[arg(long)]
    no_charts: bool,
}

#[derive(Parser)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Destination CSV.
    #[arg(long)]
    out: PathBuf,

    /// The column to export.
    #[arg(long, value_enum)]
    field: Option<PriceField>,
}

/// Folds the shared input flags into the configuration.
fn apply_input_args(args: InputArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(input) = args.input {
        config.data.input = input;
    }
    if let Some(symbol) = args.symbol {
        config.data.symbol = symbol;
    }
    config.validate().context("Invalid command-line arguments")?;
    Ok(())
}

fn load_table(config: &Config) -> anyhow::Result<storage::LoadedTable> {
    storage::load_csv(&config.data.input, &config.data.symbol)
        .with_context(|| format!("Failed to load {}", config.data.input.display()))
}

// ==============================================================================
// Fetch Command Logic
// ==============================================================================

/// Downloads one month per request, concurrently, and writes the merged history.
async fn handle_fetch(args: FetchArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(symbol) = args.symbol {
        config.data.symbol = symbol;
    }
    if let Some(out) = args.out {
        config.data.input = out;
    }
    config.validate().context("Invalid command-line arguments")?;

    let today = Utc::now().date_naive();
    let to = args.to.unwrap_or_else(|| today.pred_opt().unwrap_or(today));
    if args.from > to {
        bail!("--from {} is after --to {}", args.from, to);
    }
    let symbol = config.data.symbol.clone();
    info!(%symbol, from = %args.from, %to, "Starting download");

    let client: Arc<dyn ApiClient> = Arc::new(
        BinanceClient::new(&config.fetch).context("Failed to build the HTTP client")?,
    );
    let klines = fetch_ranges(client, &symbol, monthly_ranges(args.from, to), config.fetch.concurrency)
        .await?;
    let klines = drop_open_klines(klines, Utc::now());

    let table = merge_klines(&symbol, klines)
        .with_context(|| format!("No daily data returned for {}", symbol))?;
    storage::write_prices(&config.data.input, &table)
        .with_context(|| format!("Failed to write {}", config.data.input.display()))?;

    println!(
        "Saved {} daily rows of {} ({} to {}) to {}",
        table.len(),
        symbol,
        table.first_date(),
        table.last_date(),
        config.data.input.display()
    );
    Ok(())
}

async fn fetch_ranges(
    client: Arc<dyn ApiClient>,
    symbol: &str,
    ranges: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    concurrency: usize,
) -> anyhow::Result<Vec<Kline>> {
    let progress_bar = ProgressBar::new(ranges.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let permits = Arc::new(Semaphore::new(concurrency));
    let tasks: Vec<_> = ranges
        .into_iter()
        .map(|(start, end)| {
            let client = Arc::clone(&client);
            let permits = Arc::clone(&permits);
            let symbol = symbol.to_string();
            let pb = progress_bar.clone();

            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await?;
                pb.set_message(format!("Fetching {}...", start.format("%Y-%m")));
                let klines = client.fetch_daily(&symbol, start, end).await?;
                pb.inc(1);
                Ok::<Vec<Kline>, anyhow::Error>(klines)
            })
        })
        .collect();

    let results = join_all(tasks).await;
    progress_bar.finish_with_message("Download complete!");

    let mut klines = Vec::new();
    for result in results {
        klines.extend(result.context("A download task panicked")??);
    }
    Ok(klines)
}

/// Removes candles that had not closed at `now`; their close is only the latest trade.
fn drop_open_klines(klines: Vec<Kline>, now: DateTime<Utc>) -> Vec<Kline> {
    let fetched = klines.len();
    let closed: Vec<Kline> = klines.into_iter().filter(|k| k.close_time <= now).collect();
    if closed.len() < fetched {
        warn!(dropped = fetched - closed.len(), "Dropped candles that are still open");
    }
    closed
}

/// One record per trading date; a later kline for the same date replaces an earlier one.
fn merge_klines(symbol: &str, klines: Vec<Kline>) -> anyhow::Result<PriceTable> {
    let fetched = klines.len();
    let by_date: BTreeMap<NaiveDate, PriceRecord> = klines
        .into_iter()
        .map(Kline::into_record)
        .map(|record| (record.date, record))
        .collect();
    if by_date.len() < fetched {
        warn!(duplicates = fetched - by_date.len(), "Dropped overlapping klines");
    }
    Ok(PriceTable::new(symbol, by_date.into_values().collect())?)
}

/// Generates a (start, end) tuple for each calendar month between `from` and `to`.
/// Daily klines for one month stay well below the per-request limit.
fn monthly_ranges(from: NaiveDate, to: NaiveDate) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut ranges = Vec::new();
    let mut start = from;

    while start <= to {
        let end = last_day_of_month(start).min(to);
        let end_time = end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1)
            - Duration::milliseconds(1);
        ranges.push((start.and_time(NaiveTime::MIN).and_utc(), end_time));

        match end.succ_opt() {
            Some(next) => start = next,
            None => break,
        }
    }

    ranges
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

// ==============================================================================
// Describe / Analyze / Export Command Logic
// ==============================================================================

fn handle_describe(args: InputArgs, config: &mut Config) -> anyhow::Result<()> {
    apply_input_args(args, config)?;
    let loaded = load_table(config)?;
    let summaries = AnalyticsEngine::new().describe_table(&loaded.table);

    render::print_quality(&loaded.table, &loaded.quality);
    render::print_summaries(&summaries, &loaded.quality);
    Ok(())
}

fn handle_analyze(args: AnalyzeArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(field) = args.field {
        config.analysis.field = field;
    }
    if let Some(max_lag) = args.max_lag {
        config.analysis.max_lag = max_lag;
    }
    if let Some(window) = args.sma_window {
        config.analysis.sma_window = window;
    }
    if let Some(policy) = args.missing {
        config.analysis.missing_policy = policy;
    }
    if args.no_charts {
        config.charts.enabled = false;
    }
    apply_input_args(args.input, config)?;

    let loaded = load_table(config)?;
    let report: StationarityReport = AnalyticsEngine::new()
        .analyze(&loaded.table, &config.analysis)
        .with_context(|| format!("Failed to analyse {}", config.analysis.field))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    render::print_report(&report, &config.charts)
}

fn handle_export(args: ExportArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(field) = args.field {
        config.analysis.field = field;
    }
    apply_input_args(args.input, config)?;

    let loaded = load_table(config)?;
    let level = loaded
        .table
        .series(config.analysis.field, config.analysis.missing_policy)?;

    let mut columns = vec![level.clone()];
    for transform in Transform::ALL.into_iter().filter(|t| *t != Transform::Level) {
        match analytics::transforms::apply(transform, &level) {
            Ok(series) => columns.push(series),
            Err(e) => warn!(%transform, error = %e, "Transform left out of the export"),
        }
    }
    columns.push(sma_series(&level, config.analysis.sma_window)?);

    let refs: Vec<&Series> = columns.iter().collect();
    storage::write_series(&args.out, &refs)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    println!("Wrote {} columns to {}", refs.len(), args.out.display());
    Ok(())
}

/// The moving average as a sparse series: dates before the window fills are left out.
fn sma_series(level: &Series, window: usize) -> anyhow::Result<Series> {
    let sma = analytics::rolling::sma(level.values(), window)?;
    let (dates, values): (Vec<NaiveDate>, Vec<f64>) = level
        .dates()
        .iter()
        .zip(sma)
        .filter_map(|(date, v)| v.map(|v| (*date, v)))
        .unzip();
    Ok(Series::new(format!("{}_sma{}", level.name(), window), dates, values)?)
}
