//! Yahoo Finance price adapter.
//!
//! Uses the v8 chart endpoint with a daily interval and returns split- and
//! dividend-adjusted closes when the response carries them.

use crate::domain::error::MacrossError;
use crate::domain::price::PricePoint;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

/// Exchange offset from UTC in seconds; bars are dated in exchange time.
#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i32,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    #[serde(default)]
    adjclose: Vec<AdjCloseData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(base_url: &str) -> Result<Self, MacrossError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MacrossError::DataSource {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, MacrossError> {
        let base_url = config
            .get_string("data", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }

    fn chart_url(&self, ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&period1={}&period2={}&events=div%2Csplits",
            self.base_url,
            ticker,
            unix_seconds(start_date),
            unix_seconds(end_date)
        )
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Turn a chart response body into ascending daily prices within
/// `[start_date, end_date)`. Timestamps are dated in the exchange's own
/// time zone. Null closes are skipped; repeated dates keep the last value.
pub fn parse_chart_response(
    body: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<PricePoint>, MacrossError> {
    let response: YahooResponse =
        serde_json::from_str(body).map_err(|e| MacrossError::DataSource {
            reason: format!("failed to parse response: {}", e),
        })?;

    if let Some(error) = response.chart.error {
        return Err(MacrossError::DataSource {
            reason: format!("Yahoo API error: {} - {}", error.code, error.description),
        });
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let closes: Vec<Option<f64>> = match result.indicators.adjclose.into_iter().next() {
        Some(adj) if !adj.adjclose.is_empty() => adj.adjclose,
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let offset = FixedOffset::east_opt(result.meta.gmtoffset).ok_or_else(|| {
        MacrossError::DataSource {
            reason: format!("invalid exchange offset {}", result.meta.gmtoffset),
        }
    })?;

    let mut prices: Vec<PricePoint> = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(price) = closes.get(i).copied().flatten() else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.with_timezone(&offset).date_naive()) else {
            continue;
        };
        if date < start_date || date >= end_date {
            continue;
        }
        match prices.last_mut() {
            Some(last) if last.date == date => last.price = price,
            _ => prices.push(PricePoint { date, price }),
        }
    }

    prices.sort_by_key(|p| p.date);
    Ok(prices)
}

impl PriceDataPort for YahooAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, MacrossError> {
        let url = self.chart_url(ticker, start_date, end_date);
        debug!(%url, "fetching Yahoo chart data");

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.text())
            .map_err(|e| MacrossError::DataSource {
                reason: format!("request for {} failed: {}", ticker, e),
            })?;

        parse_chart_response(&body, start_date, end_date)
    }
}
