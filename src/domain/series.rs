//! Per-date rows of the working series.
//!
//! Each pipeline stage consumes the previous stage's rows and returns a new
//! `Vec` of wider rows; no stage edits an earlier stage's columns.

use chrono::NaiveDate;

use super::signal::Signal;

/// Output of the indicator stage: a row where both averages are defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub price: f64,
    pub ma_fast: f64,
    pub ma_slow: f64,
}

/// Output of the signal stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub price: f64,
    pub ma_fast: f64,
    pub ma_slow: f64,
    pub signal: Signal,
    /// Previous row's signal; `Flat` on the first row.
    pub position: Signal,
}

/// Fully simulated row, one per working-series date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestRow {
    pub date: NaiveDate,
    pub price: f64,
    pub ma_fast: f64,
    pub ma_slow: f64,
    pub signal: Signal,
    pub position: Signal,
    pub returns: f64,
    pub strategy_returns: f64,
    pub equity: f64,
}
