//! Domain error types.

/// Top-level error type for crosstrader.
///
/// Configuration and data errors abort the cycle before any order is
/// attempted. [`EngineError::Broker`] is raised by port implementations;
/// the executor catches it at the submission step and downgrades it into a
/// declined execution result so every cycle ends with a reportable outcome.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("short_window ({short_window}) must be less than long_window ({long_window})")]
    InvalidWindows {
        short_window: usize,
        long_window: usize,
    },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("no data received for {symbol}")]
    NoData { symbol: String },

    #[error("malformed data for {symbol}: {reason}")]
    MalformedData { symbol: String, reason: String },

    #[error("broker error during {operation}: {reason}")]
    Broker { operation: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io(_) => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. }
            | EngineError::InvalidWindows { .. } => 2,
            EngineError::Broker { .. } => 3,
            EngineError::NoData { .. } | EngineError::MalformedData { .. } => 4,
            EngineError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
