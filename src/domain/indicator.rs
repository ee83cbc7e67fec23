//! Simple moving average over closing prices.
//!
//! One point per input bar; the first (period - 1) points are warmup and
//! flagged invalid. Maintains a running window sum rather than re-averaging
//! each bar.

use chrono::{DateTime, Utc};

use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone)]
pub struct SmaPoint {
    pub timestamp: DateTime<Utc>,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct SmaSeries {
    pub period: usize,
    pub values: Vec<SmaPoint>,
}

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> SmaSeries {
    if period == 0 {
        return SmaSeries {
            period,
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }

        if i < period - 1 {
            values.push(SmaPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: 0.0,
            });
        } else {
            values.push(SmaPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: window_sum / period as f64,
            });
        }
    }

    SmaSeries { period, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "TEST".into(),
                timestamp: Utc.timestamp_opt(86_400 * (i as i64 + 1), 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert_eq!(series.values.len(), 5);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn sma_values_are_window_means() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert!((series.values[2].value - 20.0).abs() < f64::EPSILON);
        assert!((series.values[3].value - 30.0).abs() < f64::EPSILON);
        assert!((series.values[4].value - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_period_1_tracks_closes() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_sma(&bars, 1);

        for (point, bar) in series.values.iter().zip(&bars) {
            assert!(point.valid);
            assert!((point.value - bar.close).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn sma_equal_prices() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        let series = calculate_sma(&bars, 2);

        for point in &series.values[1..] {
            assert!((point.value - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn sma_fewer_bars_than_period() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 5);

        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_period_0() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 0);
        assert!(series.values.is_empty());
    }

    #[test]
    fn sma_empty_bars() {
        let series = calculate_sma(&[], 3);
        assert!(series.values.is_empty());
    }
}
