//! Brokerage port trait.

use crate::domain::account::{AccountSnapshot, OrderHandle, OrderRecord, OrderSide};
use crate::domain::error::EngineError;

/// Brokerage operations the engine calls against.
///
/// Implementations own retry and reconnect behavior for transient API
/// failures; by the time an [`EngineError::Broker`] reaches the caller the
/// retry budget is spent.
pub trait BrokerPort {
    fn get_account(&self) -> Result<AccountSnapshot, EngineError>;

    fn get_open_orders(&self) -> Result<Vec<OrderRecord>, EngineError>;

    fn submit_order(
        &self,
        symbol: &str,
        qty: f64,
        side: OrderSide,
    ) -> Result<OrderHandle, EngineError>;

    fn cancel_order(&self, order_id: &str) -> Result<(), EngineError>;
}
