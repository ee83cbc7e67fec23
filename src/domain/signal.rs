//! Trade signal types.

use chrono::{DateTime, Utc};
use std::fmt;

/// Direction recommendation from the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Structured strategy output consumed by the risk engine and executor.
///
/// `timestamp` is the wall-clock generation time, not the last bar's time.
/// Field names are a stable contract for downstream structured logging.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySignal {
    pub symbol: String,
    pub signal: Signal,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}
