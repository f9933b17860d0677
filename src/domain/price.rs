//! Daily closing price representation.

use chrono::NaiveDate;

use super::error::MacrossError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Check that a provider's series is usable: strictly increasing dates and
/// positive, finite prices. An empty series passes; emptiness is reported
/// separately as `NoData`.
pub fn validate_prices(prices: &[PricePoint]) -> Result<(), MacrossError> {
    for (i, point) in prices.iter().enumerate() {
        if !point.price.is_finite() || point.price <= 0.0 {
            return Err(MacrossError::InvalidPriceData {
                reason: format!("non-positive price {} on {}", point.price, point.date),
            });
        }
        if i > 0 && prices[i - 1].date >= point.date {
            return Err(MacrossError::InvalidPriceData {
                reason: format!(
                    "dates not strictly increasing: {} followed by {}",
                    prices[i - 1].date,
                    point.date
                ),
            });
        }
    }
    Ok(())
}
