//! Order execution.
//!
//! Translates an approved signal into a sized market order and submits it
//! through the broker port. Always returns an [`ExecutionResult`]: a broker
//! failure at the submission step is captured in the result, not raised, so
//! every cycle ends with an auditable outcome.

use tracing::{error, info};

use crate::domain::account::OrderSide;
use crate::domain::risk::RiskDecision;
use crate::domain::signal::{Signal, StrategySignal};
use crate::ports::broker_port::BrokerPort;

/// Terminal artifact of a cycle. Field names are a stable contract for
/// downstream structured logging.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub executed: bool,
    pub reason: String,
    pub qty: f64,
    pub order_id: Option<String>,
}

impl ExecutionResult {
    fn declined(reason: impl Into<String>, qty: f64) -> Self {
        Self {
            executed: false,
            reason: reason.into(),
            qty,
            order_id: None,
        }
    }
}

pub struct TradeExecutor<'a> {
    broker: &'a dyn BrokerPort,
}

impl<'a> TradeExecutor<'a> {
    pub fn new(broker: &'a dyn BrokerPort) -> Self {
        Self { broker }
    }

    /// Place an order only when risk approves and the signal is tradable.
    ///
    /// Quantity is `max_position_value / last_price` rounded to 4 decimal
    /// places (fractional shares).
    pub fn execute(
        &self,
        signal: &StrategySignal,
        risk_decision: &RiskDecision,
        last_price: f64,
    ) -> ExecutionResult {
        if !risk_decision.approved {
            return ExecutionResult::declined(risk_decision.reason.clone(), 0.0);
        }

        let side = match signal.signal {
            Signal::Buy => OrderSide::Buy,
            Signal::Sell => OrderSide::Sell,
            other => {
                return ExecutionResult::declined(format!("Unsupported signal {other}"), 0.0);
            }
        };

        if last_price <= 0.0 {
            return ExecutionResult::declined("Invalid market price", 0.0);
        }

        let qty = round_qty(risk_decision.max_position_value / last_price);
        if qty <= 0.0 {
            return ExecutionResult::declined("Calculated quantity is zero", 0.0);
        }

        match self.broker.submit_order(&signal.symbol, qty, side) {
            Ok(handle) => {
                info!(
                    event = "order_submitted",
                    symbol = %signal.symbol,
                    side = %side,
                    qty,
                    order_id = %handle.id,
                    "order submitted"
                );
                ExecutionResult {
                    executed: true,
                    reason: "Order submitted".to_string(),
                    qty,
                    order_id: Some(handle.id),
                }
            }
            Err(e) => {
                error!(
                    event = "order_submission_failed",
                    symbol = %signal.symbol,
                    error = %e,
                    "order submission failed"
                );
                ExecutionResult::declined(e.to_string(), qty)
            }
        }
    }
}

fn round_qty(qty: f64) -> f64 {
    (qty * 10_000.0).round() / 10_000.0
}
