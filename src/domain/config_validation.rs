//! Configuration validation.
//!
//! Every key is optional; a key that is present must hold a usable value.
//! Runs before any data is fetched.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::MacrossError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATA_SOURCES: [&str; 2] = ["yahoo", "csv"];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    validate_ticker(config)?;
    validate_initial_capital(config)?;
    validate_windows(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| DATA_SOURCES[0].to_string());
    if !DATA_SOURCES.contains(&source.trim().to_lowercase().as_str()) {
        return Err(MacrossError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{}', expected yahoo or csv", source),
        });
    }
    Ok(())
}

fn validate_ticker(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    match config.get_string("backtest", "ticker") {
        Some(s) if s.trim().is_empty() => Err(MacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "ticker".to_string(),
            reason: "ticker must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    if let Some(value) = parse_optional::<f64>(config, "backtest", "initial_capital")? {
        if !value.is_finite() || value <= 0.0 {
            return Err(MacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_capital".to_string(),
                reason: "initial_capital must be positive".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    let defaults = BacktestConfig::default();
    let fast = parse_optional::<i64>(config, "backtest", "fast_window")?
        .unwrap_or(defaults.fast_window as i64);
    let slow = parse_optional::<i64>(config, "backtest", "slow_window")?
        .unwrap_or(defaults.slow_window as i64);

    for (key, value) in [("fast_window", fast), ("slow_window", slow)] {
        if value < 1 {
            return Err(MacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!("{} must be at least 1", key),
            });
        }
    }

    if fast >= slow {
        return Err(MacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "fast_window".to_string(),
            reason: "fast_window must be smaller than slow_window".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    let defaults = BacktestConfig::default();
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?
        .unwrap_or(defaults.start_date);
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?
        .unwrap_or(defaults.end_date);

    if start >= end {
        return Err(MacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: format!("start_date {} must be before end_date {}", start, end),
        });
    }
    Ok(())
}

/// Parse an optional `[backtest]` date; an absent key is `Ok(None)`.
pub fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, MacrossError> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| MacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }),
    }
}

/// Parse a present key as `T`, reporting unparsable values instead of
/// silently falling back to a default.
pub fn parse_optional<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, MacrossError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| MacrossError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("'{}' is not a valid number", raw.trim()),
            }),
    }
}
