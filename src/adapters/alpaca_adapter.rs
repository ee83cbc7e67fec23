//! Alpaca brokerage adapter.
//!
//! Thin blocking client over the Alpaca trading REST API (paper endpoint by
//! default). Transient failures (transport errors, HTTP 429 and 5xx) are
//! retried under an explicit [`RetryPolicy`], rebuilding the HTTP client
//! between attempts; other failures surface immediately. Callers see a single
//! [`EngineError::Broker`] once the attempt budget is spent.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cell::RefCell;
use std::time::Duration as StdDuration;
use tracing::warn;

use crate::domain::account::{AccountSnapshot, OrderHandle, OrderRecord, OrderSide};
use crate::domain::error::EngineError;
use crate::ports::broker_port::BrokerPort;

pub const PAPER_BASE_URL: &str = "https://paper-api.alpaca.markets";

/// Reconnect-and-retry schedule for transient broker failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: StdDuration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: StdDuration::from_millis(1_500),
        }
    }
}

/// Alpaca `/v2/account` payload. Numeric fields arrive as strings.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    equity: String,
    #[serde(default)]
    realized_pl: Option<String>,
    #[serde(default)]
    unrealized_pl: Option<String>,
}

/// Alpaca order payload, trimmed to the fields the engine reads.
#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    symbol: String,
    side: String,
    #[serde(default)]
    filled_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct AlpacaAdapter {
    base_url: String,
    api_key: String,
    secret_key: String,
    retry: RetryPolicy,
    client: RefCell<reqwest::blocking::Client>,
}

impl AlpacaAdapter {
    /// Credentials are required; keys normally come from the
    /// `ALPACA_API_KEY` / `ALPACA_SECRET_KEY` environment variables.
    pub fn new(
        base_url: &str,
        api_key: &str,
        secret_key: &str,
        retry: RetryPolicy,
    ) -> Result<Self, EngineError> {
        if api_key.is_empty() {
            return Err(EngineError::ConfigMissing {
                section: "broker".to_string(),
                key: "ALPACA_API_KEY".to_string(),
            });
        }
        if secret_key.is_empty() {
            return Err(EngineError::ConfigMissing {
                section: "broker".to_string(),
                key: "ALPACA_SECRET_KEY".to_string(),
            });
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
            retry,
            client: RefCell::new(Self::build_client()),
        })
    }

    fn build_client() -> reqwest::blocking::Client {
        reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()
            .expect("failed to build HTTP client")
    }

    fn retryable_status(status: reqwest::StatusCode) -> bool {
        status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Run one API call under the retry policy. The closure receives the
    /// current client and the base URL and returns a prepared request.
    fn request<F>(&self, operation: &str, build: F) -> Result<reqwest::blocking::Response, EngineError>
    where
        F: Fn(&reqwest::blocking::Client, &str) -> reqwest::blocking::RequestBuilder,
    {
        let mut last_reason = String::new();

        for attempt in 1..=self.retry.max_attempts {
            if attempt > 1 {
                // Reconnect before retrying.
                *self.client.borrow_mut() = Self::build_client();
                std::thread::sleep(self.retry.delay);
            }

            let client = self.client.borrow();
            let result = build(&client, &self.base_url)
                .header("APCA-API-KEY-ID", self.api_key.as_str())
                .header("APCA-API-SECRET-KEY", self.secret_key.as_str())
                .send();
            drop(client);

            match result {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().unwrap_or_default();
                    last_reason = format!("HTTP {status}: {body}");
                    if !Self::retryable_status(status) {
                        return Err(EngineError::Broker {
                            operation: operation.to_string(),
                            reason: last_reason,
                        });
                    }
                    warn!(
                        event = "broker_api_error",
                        operation,
                        attempt,
                        status = %status,
                    );
                }
                Err(e) => {
                    last_reason = e.to_string();
                    warn!(event = "broker_api_error", operation, attempt, error = %e);
                }
            }
        }

        Err(EngineError::Broker {
            operation: operation.to_string(),
            reason: last_reason,
        })
    }

    fn parse_money(operation: &str, field: &str, value: &str) -> Result<f64, EngineError> {
        value.parse().map_err(|_| EngineError::Broker {
            operation: operation.to_string(),
            reason: format!("unparseable {field} '{value}' in response"),
        })
    }

    fn parse_account(resp: AccountResponse) -> Result<AccountSnapshot, EngineError> {
        let op = "get_account";
        Ok(AccountSnapshot {
            equity: Self::parse_money(op, "equity", &resp.equity)?,
            realized_pnl: match resp.realized_pl {
                Some(v) => Self::parse_money(op, "realized_pl", &v)?,
                None => 0.0,
            },
            unrealized_pnl: match resp.unrealized_pl {
                Some(v) => Self::parse_money(op, "unrealized_pl", &v)?,
                None => 0.0,
            },
        })
    }

    fn parse_order(resp: OrderResponse) -> Result<OrderRecord, EngineError> {
        let side = match resp.side.as_str() {
            "buy" => OrderSide::Buy,
            "sell" => OrderSide::Sell,
            other => {
                return Err(EngineError::Broker {
                    operation: "get_open_orders".to_string(),
                    reason: format!("unknown order side '{other}'"),
                });
            }
        };
        Ok(OrderRecord {
            id: resp.id,
            symbol: resp.symbol,
            side,
            filled_at: resp.filled_at,
        })
    }
}

impl BrokerPort for AlpacaAdapter {
    fn get_account(&self) -> Result<AccountSnapshot, EngineError> {
        let resp = self.request("get_account", |client, base| {
            client.get(format!("{base}/v2/account"))
        })?;

        let account: AccountResponse = resp.json().map_err(|e| EngineError::Broker {
            operation: "get_account".to_string(),
            reason: format!("unexpected response: {e}"),
        })?;

        Self::parse_account(account)
    }

    fn get_open_orders(&self) -> Result<Vec<OrderRecord>, EngineError> {
        let resp = self.request("get_open_orders", |client, base| {
            client.get(format!("{base}/v2/orders?status=open"))
        })?;

        let orders: Vec<OrderResponse> = resp.json().map_err(|e| EngineError::Broker {
            operation: "get_open_orders".to_string(),
            reason: format!("unexpected response: {e}"),
        })?;

        orders.into_iter().map(Self::parse_order).collect()
    }

    fn submit_order(
        &self,
        symbol: &str,
        qty: f64,
        side: OrderSide,
    ) -> Result<OrderHandle, EngineError> {
        let body = serde_json::json!({
            "symbol": symbol,
            "qty": qty.to_string(),
            "side": side.to_string(),
            "type": "market",
            "time_in_force": "day",
        });

        let resp = self.request("submit_order", move |client, base| {
            client.post(format!("{base}/v2/orders")).json(&body)
        })?;

        let order: OrderResponse = resp.json().map_err(|e| EngineError::Broker {
            operation: "submit_order".to_string(),
            reason: format!("unexpected response: {e}"),
        })?;

        Ok(OrderHandle { id: order.id })
    }

    fn cancel_order(&self, order_id: &str) -> Result<(), EngineError> {
        self.request("cancel_order", move |client, base| {
            client.delete(format!("{base}/v2/orders/{order_id}"))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_api_key() {
        let err =
            AlpacaAdapter::new(PAPER_BASE_URL, "", "secret", RetryPolicy::default()).unwrap_err();
        assert!(matches!(err, EngineError::ConfigMissing { key, .. } if key == "ALPACA_API_KEY"));
    }

    #[test]
    fn new_requires_secret_key() {
        let err =
            AlpacaAdapter::new(PAPER_BASE_URL, "key", "", RetryPolicy::default()).unwrap_err();
        assert!(
            matches!(err, EngineError::ConfigMissing { key, .. } if key == "ALPACA_SECRET_KEY")
        );
    }

    #[test]
    fn new_trims_trailing_slash() {
        let adapter = AlpacaAdapter::new(
            "https://paper-api.alpaca.markets/",
            "key",
            "secret",
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(adapter.base_url, PAPER_BASE_URL);
    }

    #[test]
    fn default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, StdDuration::from_millis(1_500));
    }

    #[test]
    fn retryable_statuses() {
        assert!(AlpacaAdapter::retryable_status(
            reqwest::StatusCode::TOO_MANY_REQUESTS
        ));
        assert!(AlpacaAdapter::retryable_status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(AlpacaAdapter::retryable_status(
            reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
        assert!(!AlpacaAdapter::retryable_status(
            reqwest::StatusCode::UNAUTHORIZED
        ));
        assert!(!AlpacaAdapter::retryable_status(
            reqwest::StatusCode::UNPROCESSABLE_ENTITY
        ));
    }

    #[test]
    fn parse_account_converts_string_money() {
        let resp: AccountResponse = serde_json::from_str(
            r#"{"equity":"100000.25","realized_pl":"-120.5","unrealized_pl":"80.0"}"#,
        )
        .unwrap();

        let snapshot = AlpacaAdapter::parse_account(resp).unwrap();
        assert!((snapshot.equity - 100_000.25).abs() < f64::EPSILON);
        assert!((snapshot.realized_pnl - -120.5).abs() < f64::EPSILON);
        assert!((snapshot.unrealized_pnl - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_account_defaults_missing_pnl_to_zero() {
        let resp: AccountResponse = serde_json::from_str(r#"{"equity":"50000"}"#).unwrap();

        let snapshot = AlpacaAdapter::parse_account(resp).unwrap();
        assert!((snapshot.daily_pnl() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_account_rejects_garbage_equity() {
        let resp: AccountResponse =
            serde_json::from_str(r#"{"equity":"lots"}"#).unwrap();
        assert!(AlpacaAdapter::parse_account(resp).is_err());
    }

    #[test]
    fn parse_order_maps_sides_and_fill_time() {
        let resp: OrderResponse = serde_json::from_str(
            r#"{"id":"abc","symbol":"SPY","side":"buy","filled_at":"2026-08-05T14:30:00Z"}"#,
        )
        .unwrap();

        let record = AlpacaAdapter::parse_order(resp).unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.side, OrderSide::Buy);
        assert!(record.filled_at.is_some());

        let resp: OrderResponse =
            serde_json::from_str(r#"{"id":"def","symbol":"SPY","side":"sell"}"#).unwrap();
        let record = AlpacaAdapter::parse_order(resp).unwrap();
        assert_eq!(record.side, OrderSide::Sell);
        assert!(record.filled_at.is_none());
    }

    #[test]
    fn parse_order_rejects_unknown_side() {
        let resp: OrderResponse =
            serde_json::from_str(r#"{"id":"x","symbol":"SPY","side":"hold"}"#).unwrap();
        assert!(AlpacaAdapter::parse_order(resp).is_err());
    }
}
