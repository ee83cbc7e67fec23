//! Hard portfolio risk limits applied before order execution.

use chrono::Utc;

use crate::domain::account::OrderRecord;
use crate::domain::signal::Signal;

/// Risk validation outcome.
///
/// `stop_loss_pct` rides on every decision for downstream reporting; nothing
/// in this engine places stop orders with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskDecision {
    pub approved: bool,
    pub reason: String,
    pub max_position_value: f64,
    pub stop_loss_pct: f64,
}

#[derive(Debug, Clone)]
pub struct RiskEngine {
    max_capital_per_position: f64,
    max_trades_per_day: u32,
    stop_loss_pct: f64,
    max_daily_loss_pct: f64,
}

impl RiskEngine {
    pub fn new(
        max_capital_per_position: f64,
        max_trades_per_day: u32,
        stop_loss_pct: f64,
        max_daily_loss_pct: f64,
    ) -> Self {
        Self {
            max_capital_per_position,
            max_trades_per_day,
            stop_loss_pct,
            max_daily_loss_pct,
        }
    }

    /// Evaluate a signal against the configured limits.
    ///
    /// Rules run in a fixed order and the first match wins: HOLD, daily
    /// trade cap, daily loss cap (strict `>`), then sizing. The approved
    /// position value is `equity * max_capital_per_position`.
    pub fn evaluate(
        &self,
        signal: Signal,
        equity: f64,
        today_trades: u32,
        daily_pnl: f64,
    ) -> RiskDecision {
        if signal == Signal::Hold {
            return self.reject("Signal is HOLD");
        }

        if today_trades >= self.max_trades_per_day {
            return self.reject("Daily trade limit reached");
        }

        let daily_loss = daily_pnl.min(0.0).abs();
        if equity > 0.0 && daily_loss / equity > self.max_daily_loss_pct {
            return self.reject("Daily loss limit exceeded");
        }

        let max_position_value = equity * self.max_capital_per_position;
        if max_position_value <= 0.0 {
            return self.reject("Invalid position sizing from equity");
        }

        RiskDecision {
            approved: true,
            reason: "Approved".to_string(),
            max_position_value,
            stop_loss_pct: self.stop_loss_pct,
        }
    }

    fn reject(&self, reason: &str) -> RiskDecision {
        RiskDecision {
            approved: false,
            reason: reason.to_string(),
            max_position_value: 0.0,
            stop_loss_pct: self.stop_loss_pct,
        }
    }
}

/// Count orders filled on the current UTC date. Unfilled records are ignored.
pub fn count_today_filled_trades(orders: &[OrderRecord]) -> u32 {
    let today = Utc::now().date_naive();
    orders
        .iter()
        .filter(|o| o.filled_at.is_some_and(|t| t.date_naive() == today))
        .count() as u32
}
