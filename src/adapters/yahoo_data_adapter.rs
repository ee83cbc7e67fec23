//! Yahoo Finance market data adapter.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API for a trailing period.
//! Rows with any missing field are dropped during normalization; an empty
//! result surfaces as [`EngineError::NoData`]. Yahoo has no official API, so
//! the CSV adapter is the fallback when the response shape changes.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::warn;

use crate::domain::error::EngineError;
use crate::domain::ohlcv::{normalize_history, PriceBar};
use crate::ports::data_port::MarketDataPort;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartOutcome,
}

#[derive(Debug, Deserialize)]
struct ChartOutcome {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct YahooDataAdapter {
    client: reqwest::blocking::Client,
}

impl YahooDataAdapter {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    fn chart_url(symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={}&period2={}&interval=1d",
            start.timestamp(),
            end.timestamp(),
        )
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, EngineError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    EngineError::NoData {
                        symbol: symbol.to_string(),
                    }
                } else {
                    EngineError::MalformedData {
                        symbol: symbol.to_string(),
                        reason: format!("{}: {}", err.code, err.description),
                    }
                }
            } else {
                EngineError::MalformedData {
                    symbol: symbol.to_string(),
                    reason: "empty result with no error".into(),
                }
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::MalformedData {
                symbol: symbol.to_string(),
                reason: "result array is empty".into(),
            })?;

        let timestamps = data.timestamp.ok_or_else(|| EngineError::MalformedData {
            symbol: symbol.to_string(),
            reason: "no timestamps".into(),
        })?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::MalformedData {
                symbol: symbol.to_string(),
                reason: "no quote data".into(),
            })?;

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp =
                DateTime::from_timestamp(ts, 0).ok_or_else(|| EngineError::MalformedData {
                    symbol: symbol.to_string(),
                    reason: format!("invalid timestamp: {ts}"),
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Any missing field drops the whole row (holidays, half-days,
            // incomplete current bar).
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) =
                (open, high, low, close, volume)
            else {
                continue;
            };

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                timestamp,
                open,
                high,
                low,
                close,
                volume: volume as i64,
            });
        }

        if bars.is_empty() {
            return Err(EngineError::NoData {
                symbol: symbol.to_string(),
            });
        }

        normalize_history(&mut bars);
        Ok(bars)
    }
}

impl Default for YahooDataAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataPort for YahooDataAdapter {
    fn get_ohlcv(&self, symbol: &str, period: Duration) -> Result<Vec<PriceBar>, EngineError> {
        let end = Utc::now();
        let url = Self::chart_url(symbol, end - period, end);

        let resp = self.client.get(&url).send().map_err(|e| {
            warn!(event = "market_data_request_failed", symbol, error = %e);
            EngineError::NoData {
                symbol: symbol.to_string(),
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EngineError::NoData {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            warn!(event = "market_data_http_error", symbol, status = %status);
            return Err(EngineError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| EngineError::MalformedData {
            symbol: symbol.to_string(),
            reason: format!("failed to parse response: {e}"),
        })?;

        Self::parse_response(symbol, chart)
    }
}
