//! Performance metrics and statistics.

use super::series::BacktestRow;
use super::signal::Signal;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    /// Most negative drawdown, as a fraction of the running peak (<= 0).
    pub max_drawdown: f64,
    pub trading_days: usize,
    pub final_equity: f64,
    /// Fraction of rows spent long.
    pub exposure: f64,
}

impl Metrics {
    pub fn compute(rows: &[BacktestRow], initial_capital: f64) -> Self {
        let final_equity = rows.last().map(|r| r.equity).unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            final_equity / initial_capital - 1.0
        } else {
            0.0
        };

        let n = rows.len();
        let annualized_return = if n > 0 && total_return.is_finite() {
            (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / n as f64) - 1.0
        } else {
            0.0
        };

        let strategy_returns: Vec<f64> = rows.iter().map(|r| r.strategy_returns).collect();
        let annualized_volatility = sample_stddev(&strategy_returns) * TRADING_DAYS_PER_YEAR.sqrt();

        let sharpe_ratio = if annualized_volatility > 0.0 {
            annualized_return / annualized_volatility
        } else {
            0.0
        };

        let equity: Vec<f64> = rows.iter().map(|r| r.equity).collect();
        let max_drawdown = compute_drawdown(&equity)
            .into_iter()
            .fold(0.0_f64, f64::min);

        let long_days = rows.iter().filter(|r| r.position == Signal::Long).count();
        let exposure = if n > 0 {
            long_days as f64 / n as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
            trading_days: n,
            final_equity,
            exposure,
        }
    }

    /// Zero strategy-return variance; the Sharpe ratio is floored at 0.
    pub fn is_volatility_degenerate(&self) -> bool {
        self.annualized_volatility <= 0.0
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_return: format_percent(self.total_return),
            annualized_return: format_percent(self.annualized_return),
            annualized_volatility: format_percent(self.annualized_volatility),
            sharpe_ratio: format!("{:.2}", self.sharpe_ratio),
            max_drawdown: format_percent(self.max_drawdown),
        }
    }
}

/// The reported metrics record, formatted for `metrics.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSummary {
    pub total_return: String,
    pub annualized_return: String,
    pub annualized_volatility: String,
    pub sharpe_ratio: String,
    pub max_drawdown: String,
}

impl MetricsSummary {
    pub const HEADERS: [&'static str; 5] = [
        "Total Return",
        "Annualized Return",
        "Annualized Volatility",
        "Sharpe Ratio",
        "Max Drawdown",
    ];

    pub fn fields(&self) -> [&str; 5] {
        [
            &self.total_return,
            &self.annualized_return,
            &self.annualized_volatility,
            &self.sharpe_ratio,
            &self.max_drawdown,
        ]
    }
}

/// Fraction as a percentage with two decimals, e.g. `0.1234` -> `12.34%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Sample (n-1) standard deviation. Fewer than two values yields 0.
pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Drawdown of each point from the running maximum, as a fraction of that
/// maximum. Values are <= 0.
pub fn compute_drawdown(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;

    equity
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            if peak > 0.0 {
                (value - peak) / peak
            } else {
                0.0
            }
        })
        .collect()
}
