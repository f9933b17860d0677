#![allow(dead_code)]

use chrono::NaiveDate;
use macross::domain::backtest::BacktestConfig;
use macross::domain::error::MacrossError;
pub use macross::domain::price::PricePoint;
use macross::ports::data_port::PriceDataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockPriceDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_prices(mut self, ticker: &str, prices: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), prices);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, MacrossError> {
        self.calls
            .borrow_mut()
            .push((ticker.to_string(), start_date, end_date));
        if let Some(reason) = self.errors.get(ticker) {
            return Err(MacrossError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting at `start_date`, one per value.
pub fn make_prices(start_date: &str, values: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            price,
        })
        .collect()
}

/// A deterministic wave with drift; crosses its averages several times.
pub fn generate_wave(start_date: &str, count: usize, base: f64) -> Vec<PricePoint> {
    let values: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            base + 0.05 * t + 8.0 * (t / 9.0).sin()
        })
        .collect();
    make_prices(start_date, &values)
}

pub fn config(ticker: &str, fast: usize, slow: usize) -> BacktestConfig {
    BacktestConfig {
        ticker: ticker.to_string(),
        start_date: date(2020, 1, 1),
        end_date: date(2024, 1, 1),
        fast_window: fast,
        slow_window: slow,
        initial_capital: 10_000.0,
    }
}
