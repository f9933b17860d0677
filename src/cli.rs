//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_report::FileReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    parse_date, parse_optional, validate_backtest_config, validate_data_config,
};
use crate::domain::error::MacrossError;
use crate::domain::metrics::Metrics;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_OUTPUT_DIR: &str = "results";
pub const DEFAULT_CSV_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "macross", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write results
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Instrument identifier, e.g. AAPL
    #[arg(long)]
    pub ticker: Option<String>,
    /// First date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub start: Option<String>,
    /// Last date (YYYY-MM-DD, exclusive)
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub fast: Option<usize>,
    #[arg(long)]
    pub slow: Option<usize>,
    #[arg(long)]
    pub capital: Option<f64>,
    /// Price source: yahoo or csv
    #[arg(long)]
    pub source: Option<String>,
    /// Directory holding <TICKER>.csv files for the csv source
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            overrides,
            dry_run,
        } => run_backtest(config.as_ref(), &overrides, dry_run),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = MacrossError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn apply_overrides(adapter: &mut FileConfigAdapter, overrides: &Overrides) {
    if let Some(ticker) = &overrides.ticker {
        adapter.set("backtest", "ticker", ticker.as_str());
    }
    if let Some(start) = &overrides.start {
        adapter.set("backtest", "start_date", start.as_str());
    }
    if let Some(end) = &overrides.end {
        adapter.set("backtest", "end_date", end.as_str());
    }
    if let Some(fast) = overrides.fast {
        adapter.set("backtest", "fast_window", fast.to_string());
    }
    if let Some(slow) = overrides.slow {
        adapter.set("backtest", "slow_window", slow.to_string());
    }
    if let Some(capital) = overrides.capital {
        adapter.set("backtest", "initial_capital", capital.to_string());
    }
    if let Some(source) = &overrides.source {
        adapter.set("data", "source", source.as_str());
    }
    if let Some(dir) = &overrides.data_dir {
        adapter.set("data", "csv_dir", dir.display().to_string());
    }
    if let Some(dir) = &overrides.output {
        adapter.set("output", "dir", dir.display().to_string());
    }
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, MacrossError> {
    let defaults = BacktestConfig::default();

    let ticker = adapter
        .get_string("backtest", "ticker")
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .unwrap_or(defaults.ticker);

    let start_date = parse_date(adapter.get_string("backtest", "start_date").as_deref(), "start_date")?
        .unwrap_or(defaults.start_date);
    let end_date = parse_date(adapter.get_string("backtest", "end_date").as_deref(), "end_date")?
        .unwrap_or(defaults.end_date);

    Ok(BacktestConfig {
        ticker,
        start_date,
        end_date,
        fast_window: parse_optional(adapter, "backtest", "fast_window")?
            .unwrap_or(defaults.fast_window),
        slow_window: parse_optional(adapter, "backtest", "slow_window")?
            .unwrap_or(defaults.slow_window),
        initial_capital: parse_optional(adapter, "backtest", "initial_capital")?
            .unwrap_or(defaults.initial_capital),
    })
}

pub fn resolve_output_dir(adapter: &dyn ConfigPort) -> PathBuf {
    adapter
        .get_string("output", "dir")
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

pub fn resolve_source(adapter: &dyn ConfigPort) -> String {
    adapter
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "yahoo".to_string())
}

pub fn build_data_port(adapter: &dyn ConfigPort) -> Result<Box<dyn PriceDataPort>, MacrossError> {
    match resolve_source(adapter).as_str() {
        "csv" => {
            let dir = adapter
                .get_string("data", "csv_dir")
                .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string());
            Ok(Box::new(CsvPriceAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "yahoo")]
        "yahoo" => {
            use crate::adapters::yahoo_adapter::YahooAdapter;
            Ok(Box::new(YahooAdapter::from_config(adapter)?))
        }
        #[cfg(not(feature = "yahoo"))]
        "yahoo" => Err(MacrossError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "yahoo feature is required for the yahoo source".into(),
        }),
        other => Err(MacrossError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source '{}', expected yahoo or csv", other),
        }),
    }
}

/// Fetch, compute and write. Nothing is written unless the computation
/// succeeds.
pub fn run_pipeline(
    data_port: &dyn PriceDataPort,
    report_port: &dyn ReportPort,
    config: &BacktestConfig,
    output_dir: &Path,
) -> Result<BacktestResult, MacrossError> {
    info!(
        "Running Moving Average Crossover backtest for {}...",
        config.ticker
    );
    info!("Period: {} to {}", config.start_date, config.end_date);

    let prices = data_port.fetch_prices(&config.ticker, config.start_date, config.end_date)?;
    info!("Fetched {} prices for {}", prices.len(), config.ticker);

    let result = backtest_engine::run_backtest(&prices, config)?;

    report_port.write(&result, config, output_dir)?;
    Ok(result)
}

pub fn print_summary(config: &BacktestConfig, metrics: &Metrics) {
    let summary = metrics.summary();
    eprintln!("\n=== {} SMA({}/{}) ===", config.ticker, config.fast_window, config.slow_window);
    eprintln!("Trading Days:          {}", metrics.trading_days);
    eprintln!("Final Equity:          {:.2}", metrics.final_equity);
    eprintln!("Exposure:              {:.1}%", metrics.exposure * 100.0);
    eprintln!("Total Return:          {}", summary.total_return);
    eprintln!("Annualized Return:     {}", summary.annualized_return);
    eprintln!("Annualized Volatility: {}", summary.annualized_volatility);
    eprintln!("Sharpe Ratio:          {}", summary.sharpe_ratio);
    eprintln!("Max Drawdown:          {}", summary.max_drawdown);
}

fn resolve(
    config_path: Option<&PathBuf>,
    overrides: &Overrides,
) -> Result<(FileConfigAdapter, BacktestConfig), ExitCode> {
    let mut adapter = load_config(config_path)?;
    apply_overrides(&mut adapter, overrides);

    let built = validate_backtest_config(&adapter)
        .and_then(|()| validate_data_config(&adapter))
        .and_then(|()| build_backtest_config(&adapter));
    match built {
        Ok(config) => Ok((adapter, config)),
        Err(e) => {
            eprintln!("error: {e}");
            Err((&e).into())
        }
    }
}

fn run_backtest(config_path: Option<&PathBuf>, overrides: &Overrides, dry_run: bool) -> ExitCode {
    let (adapter, bt_config) = match resolve(config_path, overrides) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let output_dir = resolve_output_dir(&adapter);

    if dry_run {
        print_resolved(&adapter, &bt_config, &output_dir);
        eprintln!("\nDry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match run_pipeline(data_port.as_ref(), &FileReportAdapter::new(), &bt_config, &output_dir) {
        Ok(result) => {
            print_summary(&bt_config, &result.metrics);
            eprintln!("\nBacktest completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn print_resolved(adapter: &dyn ConfigPort, config: &BacktestConfig, output_dir: &Path) {
    eprintln!("Backtest parameters:");
    eprintln!("  ticker:          {}", config.ticker);
    eprintln!("  period:          {} to {}", config.start_date, config.end_date);
    eprintln!("  fast_window:     {}", config.fast_window);
    eprintln!("  slow_window:     {}", config.slow_window);
    eprintln!("  initial_capital: {:.2}", config.initial_capital);
    eprintln!("  source:          {}", resolve_source(adapter));
    eprintln!("  output:          {}", output_dir.display());
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let (adapter, bt_config) = match resolve(Some(config_path), &Overrides::default()) {
        Ok(r) => r,
        Err(code) => return code,
    };
    print_resolved(&adapter, &bt_config, &resolve_output_dir(&adapter));
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
