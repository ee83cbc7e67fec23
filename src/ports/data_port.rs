//! Market data port trait.

use chrono::Duration;

use crate::domain::error::EngineError;
use crate::domain::ohlcv::PriceBar;

/// Source of OHLCV price history.
///
/// Implementations return bars covering the trailing `period` ending now,
/// strictly ascending by timestamp, with no duplicate timestamps and no
/// missing fields. An empty result is an error
/// ([`EngineError::NoData`]), never an empty vector.
pub trait MarketDataPort {
    fn get_ohlcv(&self, symbol: &str, period: Duration) -> Result<Vec<PriceBar>, EngineError>;
}
