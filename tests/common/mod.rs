#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use std::cell::RefCell;

use crosstrader::domain::account::{AccountSnapshot, OrderHandle, OrderRecord, OrderSide};
use crosstrader::domain::error::EngineError;
pub use crosstrader::domain::ohlcv::PriceBar;
use crosstrader::ports::broker_port::BrokerPort;
use crosstrader::ports::data_port::MarketDataPort;

pub struct MockDataPort {
    pub bars: Vec<PriceBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn with_bars(bars: Vec<PriceBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn with_no_data() -> Self {
        Self {
            bars: Vec::new(),
            error: Some("no data".to_string()),
        }
    }
}

impl MarketDataPort for MockDataPort {
    fn get_ohlcv(&self, symbol: &str, _period: Duration) -> Result<Vec<PriceBar>, EngineError> {
        if self.error.is_some() {
            return Err(EngineError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(self.bars.clone())
    }
}

pub struct MockBrokerPort {
    pub account: AccountSnapshot,
    pub open_orders: Vec<OrderRecord>,
    pub fail_account: bool,
    pub fail_submit: Option<String>,
    pub submitted: RefCell<Vec<(String, f64, OrderSide)>>,
}

impl MockBrokerPort {
    pub fn new() -> Self {
        Self {
            account: AccountSnapshot {
                equity: 100_000.0,
                realized_pnl: 0.0,
                unrealized_pnl: 0.0,
            },
            open_orders: Vec::new(),
            fail_account: false,
            fail_submit: None,
            submitted: RefCell::new(Vec::new()),
        }
    }

    pub fn with_equity(mut self, equity: f64) -> Self {
        self.account.equity = equity;
        self
    }

    pub fn with_daily_pnl(mut self, realized: f64, unrealized: f64) -> Self {
        self.account.realized_pnl = realized;
        self.account.unrealized_pnl = unrealized;
        self
    }

    /// Seed `count` orders filled today plus one older fill and one unfilled.
    pub fn with_fills_today(mut self, count: usize) -> Self {
        let now = Utc::now();
        for i in 0..count {
            self.open_orders.push(OrderRecord {
                id: format!("fill-{i}"),
                symbol: "SPY".to_string(),
                side: OrderSide::Buy,
                filled_at: Some(now),
            });
        }
        self.open_orders.push(OrderRecord {
            id: "old".to_string(),
            symbol: "SPY".to_string(),
            side: OrderSide::Sell,
            filled_at: Some(now - Duration::days(3)),
        });
        self.open_orders.push(OrderRecord {
            id: "pending".to_string(),
            symbol: "SPY".to_string(),
            side: OrderSide::Buy,
            filled_at: None,
        });
        self
    }

    pub fn failing_submit(mut self, reason: &str) -> Self {
        self.fail_submit = Some(reason.to_string());
        self
    }

    pub fn failing_account(mut self) -> Self {
        self.fail_account = true;
        self
    }
}

impl BrokerPort for MockBrokerPort {
    fn get_account(&self) -> Result<AccountSnapshot, EngineError> {
        if self.fail_account {
            return Err(EngineError::Broker {
                operation: "get_account".to_string(),
                reason: "HTTP 503".to_string(),
            });
        }
        Ok(self.account.clone())
    }

    fn get_open_orders(&self) -> Result<Vec<OrderRecord>, EngineError> {
        Ok(self.open_orders.clone())
    }

    fn submit_order(
        &self,
        symbol: &str,
        qty: f64,
        side: OrderSide,
    ) -> Result<OrderHandle, EngineError> {
        if let Some(reason) = &self.fail_submit {
            return Err(EngineError::Broker {
                operation: "submit_order".to_string(),
                reason: reason.clone(),
            });
        }
        self.submitted
            .borrow_mut()
            .push((symbol.to_string(), qty, side));
        Ok(OrderHandle {
            id: format!("mock-order-{}", self.submitted.borrow().len()),
        })
    }

    fn cancel_order(&self, _order_id: &str) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Daily bars with the given closes, one bar per day ending yesterday.
pub fn make_bars(symbol: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            symbol: symbol.to_string(),
            timestamp: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        })
        .collect()
}

/// Closes that put the short SMA(2) above the long SMA(3) exactly between
/// the last two bars, with the final close at `last_price`.
pub fn upward_cross_closes(last_price: f64) -> Vec<f64> {
    vec![
        last_price * 1.01,
        last_price * 0.99,
        last_price * 0.99,
        last_price,
    ]
}

/// Mirror of [`upward_cross_closes`]: short SMA(2) drops below long SMA(3)
/// on the final bar.
pub fn downward_cross_closes(last_price: f64) -> Vec<f64> {
    vec![
        last_price * 0.99,
        last_price * 1.01,
        last_price * 1.01,
        last_price,
    ]
}
