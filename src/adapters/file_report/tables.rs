//! CSV tables for backtest output.
//!
//! Provides writers for:
//! - the full working series (one row per date, every column)
//! - the equity curve (date, equity)
//! - the one-row metrics summary

use std::io;

use crate::domain::metrics::MetricsSummary;
use crate::domain::series::BacktestRow;

pub const SERIES_HEADERS: [&str; 9] = [
    "date",
    "price",
    "ma_fast",
    "ma_slow",
    "signal",
    "position",
    "returns",
    "strategy_returns",
    "equity",
];

pub const EQUITY_HEADERS: [&str; 2] = ["date", "equity"];

pub fn write_series<W: io::Write>(rows: &[BacktestRow], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SERIES_HEADERS)?;

    for row in rows {
        wtr.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.price.to_string(),
            row.ma_fast.to_string(),
            row.ma_slow.to_string(),
            row.signal.to_string(),
            row.position.to_string(),
            row.returns.to_string(),
            row.strategy_returns.to_string(),
            row.equity.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_equity_curve<W: io::Write>(rows: &[BacktestRow], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EQUITY_HEADERS)?;

    for row in rows {
        wtr.write_record([row.date.format("%Y-%m-%d").to_string(), row.equity.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_metrics<W: io::Write>(summary: &MetricsSummary, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(MetricsSummary::HEADERS)?;
    wtr.write_record(summary.fields())?;
    wtr.flush()?;
    Ok(())
}
