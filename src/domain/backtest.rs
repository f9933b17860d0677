//! Backtest pipeline: indicators, signals, equity simulation and metrics.
//!
//! BacktestConfig defines the run parameters.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::error::MacrossError;
use super::indicator;
use super::metrics::{self, Metrics};
use super::performance;
use super::price::{self, PricePoint};
use super::series::BacktestRow;
use super::signal;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub fast_window: usize,
    pub slow_window: usize,
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            ticker: "AAPL".to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            fast_window: 20,
            slow_window: 50,
            initial_capital: 10_000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub rows: Vec<BacktestRow>,
    pub drawdown: Vec<f64>,
    pub metrics: Metrics,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.metrics.final_equity
    }
}

/// Run the full computation over a provider's price series.
///
/// Fails with `NoData` for an empty series and `InsufficientHistory` when no
/// row has both averages defined. Nothing past the indicator stage runs in
/// either case.
pub fn run_backtest(
    prices: &[PricePoint],
    config: &BacktestConfig,
) -> Result<BacktestResult, MacrossError> {
    if prices.is_empty() {
        return Err(MacrossError::NoData {
            ticker: config.ticker.clone(),
        });
    }
    price::validate_prices(prices)?;

    let indicator_rows = indicator::align(
        &config.ticker,
        prices,
        config.fast_window,
        config.slow_window,
    )?;
    debug!(
        raw = prices.len(),
        working = indicator_rows.len(),
        "dropped warm-up rows"
    );

    let signal_rows = signal::derive_signals(&indicator_rows);
    let rows = performance::simulate(&signal_rows, config.initial_capital);

    let equity: Vec<f64> = rows.iter().map(|r| r.equity).collect();
    let drawdown = metrics::compute_drawdown(&equity);
    let metrics = Metrics::compute(&rows, config.initial_capital);

    if metrics.is_volatility_degenerate() {
        warn!(
            ticker = %config.ticker,
            "strategy returns have zero variance; sharpe ratio reported as 0"
        );
    }

    Ok(BacktestResult {
        rows,
        drawdown,
        metrics,
    })
}
