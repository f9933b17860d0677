//! CSV file price adapter.
//!
//! Reads `<base_path>/<TICKER>.csv`. Columns are located by header name
//! (case-insensitive): `date`, plus the first of `adj close`, `close`,
//! `price` that is present.

use crate::domain::error::MacrossError;
use crate::domain::price::PricePoint;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const PRICE_COLUMNS: [&str; 3] = ["adj close", "close", "price"];

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, MacrossError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| MacrossError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| MacrossError::DataSource {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let date_idx = find_column(&headers, "date").ok_or_else(|| MacrossError::DataSource {
            reason: "missing date column".into(),
        })?;
        let price_idx = PRICE_COLUMNS
            .iter()
            .find_map(|name| find_column(&headers, name))
            .ok_or_else(|| MacrossError::DataSource {
                reason: "missing close column".into(),
            })?;

        let mut prices = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| MacrossError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_idx).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                MacrossError::DataSource {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            if date < start_date || date >= end_date {
                continue;
            }

            let raw = record.get(price_idx).unwrap_or_default().trim();
            // Blank closes are holidays/halts in exported files.
            if raw.is_empty() {
                continue;
            }
            let price: f64 = raw.parse().map_err(|e| MacrossError::DataSource {
                reason: format!("invalid close value '{}' on {}: {}", raw, date, e),
            })?;

            prices.push(PricePoint { date, price });
        }

        prices.sort_by_key(|p| p.date);
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";
        fs::write(path.join("BHP.csv"), csv_content).unwrap();

        fs::write(
            path.join("ADJ.csv"),
            "Date,Close,Adj Close\n2024-01-16,50.0,49.0\n2024-01-15,48.0,47.5\n",
        )
        .unwrap();
        fs::write(path.join("EMPTY.csv"), "date,close\n").unwrap();
        fs::write(path.join("GAPS.csv"), "date,close\n2024-01-15,1.0\n2024-01-16,\n2024-01-17,3.0\n").unwrap();
        fs::write(path.join("NOCLOSE.csv"), "date,volume\n2024-01-15,10\n").unwrap();
        fs::write(path.join("BAD.csv"), "date,close\n15/01/2024,1.0\n").unwrap();

        (dir, path)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fetch_prices_returns_closes() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let prices = adapter
            .fetch_prices("BHP", d(2024, 1, 15), d(2024, 1, 18))
            .unwrap();

        assert_eq!(prices.len(), 3);
        assert_eq!(prices[0].date, d(2024, 1, 15));
        assert_eq!(prices[0].price, 105.0);
        assert_eq!(prices[2].price, 115.0);
    }

    #[test]
    fn fetch_prices_end_date_is_exclusive() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let prices = adapter
            .fetch_prices("BHP", d(2024, 1, 16), d(2024, 1, 17))
            .unwrap();

        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].date, d(2024, 1, 16));
    }

    #[test]
    fn fetch_prices_prefers_adjusted_close_and_sorts() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let prices = adapter
            .fetch_prices("ADJ", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].date, d(2024, 1, 15));
        assert_eq!(prices[0].price, 47.5);
        assert_eq!(prices[1].price, 49.0);
    }

    #[test]
    fn fetch_prices_header_only_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let prices = adapter
            .fetch_prices("EMPTY", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap();
        assert!(prices.is_empty());
    }

    #[test]
    fn fetch_prices_skips_blank_closes() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let prices = adapter
            .fetch_prices("GAPS", d(2024, 1, 1), d(2024, 2, 1))
            .unwrap();
        let dates: Vec<NaiveDate> = prices.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 15), d(2024, 1, 17)]);
    }

    #[test]
    fn fetch_prices_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch_prices("XYZ", d(2024, 1, 1), d(2024, 1, 31));
        assert!(matches!(result, Err(MacrossError::DataSource { .. })));
    }

    #[test]
    fn fetch_prices_errors_without_close_column() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch_prices("NOCLOSE", d(2024, 1, 1), d(2024, 1, 31));
        assert!(matches!(result, Err(MacrossError::DataSource { .. })));
    }

    #[test]
    fn fetch_prices_errors_on_bad_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch_prices("BAD", d(2024, 1, 1), d(2024, 1, 31));
        assert!(result.is_err());
    }
}
