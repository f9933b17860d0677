//! Crossover signal and one-period position lag.

use std::fmt;

use super::series::{IndicatorRow, SignalRow};

/// Long-only exposure state. A tie between the averages is `Flat`; there is
/// no separate "no signal" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    #[default]
    Flat = 0,
    Long = 1,
}

impl Signal {
    /// `Long` iff the fast average is strictly above the slow one.
    pub fn from_averages(ma_fast: f64, ma_slow: f64) -> Self {
        if ma_fast > ma_slow {
            Signal::Long
        } else {
            Signal::Flat
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Exposure multiplier applied to the period's return.
    pub fn weight(self) -> f64 {
        f64::from(self.as_u8())
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Attach a signal to every row and lag it one period into a position.
///
/// `position[0]` is `Flat`, `position[t]` is `signal[t-1]`; same-day
/// information never reaches the position.
pub fn derive_signals(rows: &[IndicatorRow]) -> Vec<SignalRow> {
    let signals: Vec<Signal> = rows
        .iter()
        .map(|r| Signal::from_averages(r.ma_fast, r.ma_slow))
        .collect();

    rows.iter()
        .enumerate()
        .map(|(i, row)| SignalRow {
            date: row.date,
            price: row.price,
            ma_fast: row.ma_fast,
            ma_slow: row.ma_slow,
            signal: signals[i],
            position: if i == 0 { Signal::Flat } else { signals[i - 1] },
        })
        .collect()
}
