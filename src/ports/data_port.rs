//! Price data access port trait.

use crate::domain::error::MacrossError;
use crate::domain::price::PricePoint;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Daily closes for `ticker` with `start_date <= date < end_date`,
    /// ascending by date. An empty result is not an error here.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, MacrossError>;
}
