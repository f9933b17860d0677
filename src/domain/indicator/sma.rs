//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Each window is summed afresh so no rounding error carries between rows.
//! Warmup: first (n-1) points are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn calculate_sma(prices: &[PricePoint], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(prices.len());
    let warmup = period - 1;

    for (i, point) in prices.iter().enumerate() {
        let valid = i >= warmup;
        let sma = if valid {
            let window = &prices[i - warmup..=i];
            window.iter().map(|p| p.price).sum::<f64>() / period as f64
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: point.date,
            valid,
            value: sma,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
