//! Brokerage-facing value types.

use chrono::{DateTime, Utc};
use std::fmt;

/// Account state read fresh at the start of each cycle, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub equity: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
}

impl AccountSnapshot {
    /// Net profit and loss for the current day.
    pub fn daily_pnl(&self) -> f64 {
        self.realized_pnl + self.unrealized_pnl
    }
}

/// Side of an order on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// An order as reported by the broker. Only the fill timestamp feeds the
/// daily trade counter; the rest is audit context.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub filled_at: Option<DateTime<Utc>>,
}

/// Handle returned by a successful order submission.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderHandle {
    pub id: String,
}
