//! Moving average crossover strategy.
//!
//! Compares trailing short- and long-window SMAs of the close across the
//! last two bars: an upward cross is BUY, a downward cross is SELL,
//! anything else is HOLD. A warmup (invalid) SMA point can never register
//! a cross, so a history of exactly `long_window` bars always yields HOLD.

use chrono::Utc;

use crate::domain::error::EngineError;
use crate::domain::indicator::calculate_sma;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{Signal, StrategySignal};

#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    short_window: usize,
    long_window: usize,
}

impl MovingAverageCrossover {
    /// Window counts must satisfy `0 < short_window < long_window`.
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, EngineError> {
        if short_window == 0 || short_window >= long_window {
            return Err(EngineError::InvalidWindows {
                short_window,
                long_window,
            });
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    /// Generate one signal from price history.
    ///
    /// Pure except for the wall-clock timestamp stamped on the result.
    pub fn generate_signal(
        &self,
        symbol: &str,
        bars: &[PriceBar],
    ) -> Result<StrategySignal, EngineError> {
        if bars.len() < self.long_window {
            return Err(EngineError::InsufficientData {
                symbol: symbol.to_string(),
                bars: bars.len(),
                minimum: self.long_window,
            });
        }

        let short = calculate_sma(bars, self.short_window);
        let long = calculate_sma(bars, self.long_window);

        let n = bars.len();
        let (prev_short, curr_short) = (&short.values[n - 2], &short.values[n - 1]);
        let (prev_long, curr_long) = (&long.values[n - 2], &long.values[n - 1]);

        let crossable =
            prev_short.valid && prev_long.valid && curr_short.valid && curr_long.valid;

        let signal = if crossable
            && prev_short.value <= prev_long.value
            && curr_short.value > curr_long.value
        {
            Signal::Buy
        } else if crossable
            && prev_short.value >= prev_long.value
            && curr_short.value < curr_long.value
        {
            Signal::Sell
        } else {
            Signal::Hold
        };

        let confidence = match signal {
            Signal::Hold => 0.5,
            _ => {
                let spread = if curr_long.value == 0.0 {
                    0.0
                } else {
                    (curr_short.value - curr_long.value).abs() / curr_long.value
                };
                confidence_for_spread(spread)
            }
        };

        Ok(StrategySignal {
            symbol: symbol.to_string(),
            signal,
            confidence,
            timestamp: Utc::now(),
        })
    }
}

/// `min(0.99, round(0.5 + spread * 10, 2))`
fn confidence_for_spread(spread: f64) -> f64 {
    let raw = 0.5 + spread * 10.0;
    let rounded = (raw * 100.0).round() / 100.0;
    rounded.min(0.99)
}
