//! Configuration validation.
//!
//! Validates all config sections before any network I/O happens.

use crate::domain::error::EngineError;
use crate::domain::ohlcv::parse_history_period;
use crate::ports::config_port::ConfigPort;

pub fn validate_engine_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    validate_symbol(config)?;
    validate_history_period(config)?;
    validate_data_source(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let short = config.get_int("strategy", "short_window", 20);
    let long = config.get_int("strategy", "long_window", 50);

    if short < 1 {
        return Err(EngineError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "short_window".to_string(),
            reason: "short_window must be at least 1".to_string(),
        });
    }
    if short >= long {
        return Err(EngineError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "short_window".to_string(),
            reason: "short_window must be less than long_window".to_string(),
        });
    }
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let max_capital = config.get_double("risk", "max_capital_per_position", 0.05);
    if max_capital <= 0.0 || max_capital > 1.0 {
        return Err(EngineError::ConfigInvalid {
            section: "risk".to_string(),
            key: "max_capital_per_position".to_string(),
            reason: "max_capital_per_position must be in (0, 1]".to_string(),
        });
    }

    let max_trades = config.get_int("risk", "max_trades_per_day", 2);
    if max_trades < 0 {
        return Err(EngineError::ConfigInvalid {
            section: "risk".to_string(),
            key: "max_trades_per_day".to_string(),
            reason: "max_trades_per_day must be non-negative".to_string(),
        });
    }

    let stop_loss = config.get_double("risk", "stop_loss_pct", 0.02);
    if stop_loss < 0.0 || stop_loss >= 1.0 {
        return Err(EngineError::ConfigInvalid {
            section: "risk".to_string(),
            key: "stop_loss_pct".to_string(),
            reason: "stop_loss_pct must be in [0, 1)".to_string(),
        });
    }

    let max_daily_loss = config.get_double("risk", "max_daily_loss_pct", 0.03);
    if max_daily_loss < 0.0 || max_daily_loss >= 1.0 {
        return Err(EngineError::ConfigInvalid {
            section: "risk".to_string(),
            key: "max_daily_loss_pct".to_string(),
            reason: "max_daily_loss_pct must be in [0, 1)".to_string(),
        });
    }

    Ok(())
}

pub fn validate_broker_config(config: &dyn ConfigPort) -> Result<(), EngineError> {
    if let Some(url) = config.get_string("broker", "base_url") {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(EngineError::ConfigInvalid {
                section: "broker".to_string(),
                key: "base_url".to_string(),
                reason: "base_url must be an http(s) URL".to_string(),
            });
        }
    }

    let max_retries = config.get_int("broker", "max_retries", 3);
    if max_retries < 1 {
        return Err(EngineError::ConfigInvalid {
            section: "broker".to_string(),
            key: "max_retries".to_string(),
            reason: "max_retries must be at least 1".to_string(),
        });
    }

    let retry_wait = config.get_double("broker", "retry_wait_secs", 1.5);
    if retry_wait < 0.0 {
        return Err(EngineError::ConfigInvalid {
            section: "broker".to_string(),
            key: "retry_wait_secs".to_string(),
            reason: "retry_wait_secs must be non-negative".to_string(),
        });
    }

    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), EngineError> {
    match config.get_string("engine", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(EngineError::ConfigMissing {
            section: "engine".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_history_period(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let period = config
        .get_string("engine", "history_period")
        .unwrap_or_else(|| "6mo".to_string());
    if parse_history_period(&period).is_none() {
        return Err(EngineError::ConfigInvalid {
            section: "engine".to_string(),
            key: "history_period".to_string(),
            reason: format!("invalid period '{period}' (expected e.g. 60d, 8w, 6mo, 1y)"),
        });
    }
    Ok(())
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), EngineError> {
    let source = config
        .get_string("engine", "data_source")
        .unwrap_or_else(|| "yahoo".to_string());
    match source.as_str() {
        "yahoo" => Ok(()),
        "csv" => match config.get_string("engine", "csv_path") {
            Some(p) if !p.trim().is_empty() => Ok(()),
            _ => Err(EngineError::ConfigMissing {
                section: "engine".to_string(),
                key: "csv_path".to_string(),
            }),
        },
        other => Err(EngineError::ConfigInvalid {
            section: "engine".to_string(),
            key: "data_source".to_string(),
            reason: format!("unknown data_source '{other}' (expected yahoo or csv)"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn engine_config_valid() {
        let config = adapter("[engine]\nsymbol = SPY\nhistory_period = 6mo\n");
        assert!(validate_engine_config(&config).is_ok());
    }

    #[test]
    fn engine_config_missing_symbol() {
        let config = adapter("[engine]\nhistory_period = 6mo\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::ConfigMissing { .. }));
    }

    #[test]
    fn engine_config_bad_period() {
        let config = adapter("[engine]\nsymbol = SPY\nhistory_period = six_months\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::ConfigInvalid { .. }));
    }

    #[test]
    fn engine_config_csv_source_requires_path() {
        let config = adapter("[engine]\nsymbol = SPY\ndata_source = csv\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::ConfigMissing { .. }));

        let config =
            adapter("[engine]\nsymbol = SPY\ndata_source = csv\ncsv_path = /data/bars\n");
        assert!(validate_engine_config(&config).is_ok());
    }

    #[test]
    fn engine_config_unknown_source() {
        let config = adapter("[engine]\nsymbol = SPY\ndata_source = bloomberg\n");
        let err = validate_engine_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::ConfigInvalid { .. }));
    }

    #[test]
    fn strategy_config_valid() {
        let config = adapter("[strategy]\nshort_window = 20\nlong_window = 50\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn strategy_config_short_not_below_long() {
        let config = adapter("[strategy]\nshort_window = 50\nlong_window = 50\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::ConfigInvalid { .. }));
    }

    #[test]
    fn strategy_config_zero_short_window() {
        let config = adapter("[strategy]\nshort_window = 0\nlong_window = 50\n");
        assert!(validate_strategy_config(&config).is_err());
    }

    #[test]
    fn risk_config_defaults_are_valid() {
        let config = adapter("[risk]\n");
        assert!(validate_risk_config(&config).is_ok());
    }

    #[test]
    fn risk_config_capital_fraction_bounds() {
        let config = adapter("[risk]\nmax_capital_per_position = 0.0\n");
        assert!(validate_risk_config(&config).is_err());

        let config = adapter("[risk]\nmax_capital_per_position = 1.5\n");
        assert!(validate_risk_config(&config).is_err());

        let config = adapter("[risk]\nmax_capital_per_position = 1.0\n");
        assert!(validate_risk_config(&config).is_ok());
    }

    #[test]
    fn risk_config_loss_pct_bounds() {
        let config = adapter("[risk]\nmax_daily_loss_pct = 1.0\n");
        assert!(validate_risk_config(&config).is_err());

        let config = adapter("[risk]\nstop_loss_pct = -0.1\n");
        assert!(validate_risk_config(&config).is_err());
    }

    #[test]
    fn broker_config_defaults_are_valid() {
        let config = adapter("[broker]\n");
        assert!(validate_broker_config(&config).is_ok());
    }

    #[test]
    fn broker_config_rejects_non_http_url() {
        let config = adapter("[broker]\nbase_url = ftp://example.com\n");
        assert!(validate_broker_config(&config).is_err());
    }

    #[test]
    fn broker_config_rejects_zero_retries() {
        let config = adapter("[broker]\nmax_retries = 0\n");
        assert!(validate_broker_config(&config).is_err());
    }
}
