//! Return compounding and equity simulation.

use super::series::{BacktestRow, SignalRow};

/// Simple percentage change of each price versus the previous row; 0 on the
/// first row.
pub fn period_returns(rows: &[SignalRow]) -> Vec<f64> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if i == 0 {
                0.0
            } else {
                row.price / rows[i - 1].price - 1.0
            }
        })
        .collect()
}

/// Apply positions to returns and compound them into an equity curve
/// starting from `initial_capital`.
pub fn simulate(rows: &[SignalRow], initial_capital: f64) -> Vec<BacktestRow> {
    let returns = period_returns(rows);
    let mut growth = 1.0_f64;

    rows.iter()
        .zip(returns)
        .map(|(row, ret)| {
            let strategy_returns = row.position.weight() * ret;
            growth *= 1.0 + strategy_returns;
            BacktestRow {
                date: row.date,
                price: row.price,
                ma_fast: row.ma_fast,
                ma_slow: row.ma_slow,
                signal: row.signal,
                position: row.position,
                returns: ret,
                strategy_returns,
                equity: growth * initial_capital,
            }
        })
        .collect()
}
