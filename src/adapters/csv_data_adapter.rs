//! CSV file market data adapter.
//!
//! Offline data source for dry runs and tests. Reads `<SYMBOL>.csv` files
//! with a `timestamp,open,high,low,close,volume` header; timestamps are
//! RFC 3339 or bare `YYYY-MM-DD` dates (taken as midnight UTC).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fs;
use std::path::PathBuf;

use crate::domain::error::EngineError;
use crate::domain::ohlcv::{normalize_history, PriceBar};
use crate::ports::data_port::MarketDataPort;

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn parse_timestamp(symbol: &str, value: &str) -> Result<DateTime<Utc>, EngineError> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|d| d.and_hms_opt(0, 0, 0).unwrap().and_utc())
            .map_err(|_| EngineError::MalformedData {
                symbol: symbol.to_string(),
                reason: format!("invalid timestamp '{value}'"),
            })
    }

    fn parse_field<T: std::str::FromStr>(
        symbol: &str,
        record: &csv::StringRecord,
        index: usize,
        name: &str,
    ) -> Result<T, EngineError> {
        let raw = record.get(index).ok_or_else(|| EngineError::MalformedData {
            symbol: symbol.to_string(),
            reason: format!("missing {name} column"),
        })?;
        raw.trim()
            .parse()
            .map_err(|_| EngineError::MalformedData {
                symbol: symbol.to_string(),
                reason: format!("invalid {name} value '{raw}'"),
            })
    }
}

impl MarketDataPort for CsvDataAdapter {
    fn get_ohlcv(&self, symbol: &str, period: Duration) -> Result<Vec<PriceBar>, EngineError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|_| EngineError::NoData {
            symbol: symbol.to_string(),
        })?;

        let start = Utc::now() - period;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| EngineError::MalformedData {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {e}"),
            })?;

            let raw_ts = record.get(0).ok_or_else(|| EngineError::MalformedData {
                symbol: symbol.to_string(),
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = Self::parse_timestamp(symbol, raw_ts)?;

            if timestamp < start {
                continue;
            }

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                timestamp,
                open: Self::parse_field(symbol, &record, 1, "open")?,
                high: Self::parse_field(symbol, &record, 2, "high")?,
                low: Self::parse_field(symbol, &record, 3, "low")?,
                close: Self::parse_field(symbol, &record, 4, "close")?,
                volume: Self::parse_field(symbol, &record, 5, "volume")?,
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
