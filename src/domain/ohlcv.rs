//! OHLCV bar representation and price-history helpers.

use chrono::{DateTime, Duration, Utc};

/// One bar of price history. Sequences handed to the strategy are strictly
/// ascending by timestamp with no duplicates; data adapters guarantee this
/// via [`normalize_history`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Sort bars ascending by timestamp and drop duplicate timestamps,
/// keeping the first occurrence.
pub fn normalize_history(bars: &mut Vec<PriceBar>) {
    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
}

/// Parse a trailing history period: `"60d"`, `"8w"`, `"6mo"`, `"1y"`.
///
/// Months count as 30 days and years as 365; the window anchors at "now",
/// so calendar precision is not needed.
pub fn parse_history_period(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (digits, unit) = s.split_at(s.find(|c: char| !c.is_ascii_digit())?);
    let n: i64 = digits.parse().ok()?;
    if n <= 0 {
        return None;
    }
    match unit {
        "d" => Some(Duration::days(n)),
        "w" => Some(Duration::weeks(n)),
        "mo" => Some(Duration::days(n * 30)),
        "y" => Some(Duration::days(n * 365)),
        _ => None,
    }
}
