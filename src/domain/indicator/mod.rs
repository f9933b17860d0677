//! Trend indicators over a daily price series.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorSeries`: a time series of indicator values for one window length
//! - [`align`]: joins the fast and slow averages onto the prices, dropping
//!   warm-up rows where either average is undefined

pub mod sma;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::MacrossError;
use crate::domain::price::PricePoint;
use crate::domain::series::IndicatorRow;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.valid).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
        }
    }
}

/// Compute both moving averages and keep only the rows where both are defined.
///
/// Returns `InsufficientHistory` when no row survives, i.e. the series is
/// shorter than `slow_window`.
pub fn align(
    ticker: &str,
    prices: &[PricePoint],
    fast_window: usize,
    slow_window: usize,
) -> Result<Vec<IndicatorRow>, MacrossError> {
    let fast = sma::calculate_sma(prices, fast_window);
    let slow = sma::calculate_sma(prices, slow_window);

    let rows: Vec<IndicatorRow> = prices
        .iter()
        .zip(fast.values.iter().zip(slow.values.iter()))
        .filter(|(_, (f, s))| f.valid && s.valid)
        .map(|(p, (f, s))| IndicatorRow {
            date: p.date,
            price: p.price,
            ma_fast: f.value,
            ma_slow: s.value,
        })
        .collect();

    if rows.is_empty() {
        return Err(MacrossError::InsufficientHistory {
            ticker: ticker.to_string(),
            bars: prices.len(),
            minimum: fast_window.max(slow_window),
        });
    }

    Ok(rows)
}
