//! CLI definition and dispatch.

use chrono::Duration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration as StdDuration;
use tracing::info;

use crate::adapters::alpaca_adapter::{AlpacaAdapter, RetryPolicy, PAPER_BASE_URL};
use crate::adapters::csv_data_adapter::CsvDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::yahoo_data_adapter::YahooDataAdapter;
use crate::domain::config_validation::{
    validate_broker_config, validate_engine_config, validate_risk_config, validate_strategy_config,
};
use crate::domain::error::EngineError;
use crate::domain::execution::{ExecutionResult, TradeExecutor};
use crate::domain::ohlcv::parse_history_period;
use crate::domain::risk::{count_today_filled_trades, RiskEngine};
use crate::domain::strategy::MovingAverageCrossover;
use crate::ports::broker_port::BrokerPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(name = "crosstrader", about = "Moving-average crossover trading engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one full cycle: signal, risk check, order submission
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch data and print the signal without touching the broker
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Print the current account snapshot
    Account {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            symbol,
            dry_run,
        } => run_cycle_command(&config, symbol.as_deref(), dry_run),
        Command::Signal { config, symbol } => run_signal(&config, symbol.as_deref()),
        Command::Account { config } => run_account(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EngineError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn validate_all(config: &dyn ConfigPort) -> Result<(), EngineError> {
    validate_engine_config(config)?;
    validate_strategy_config(config)?;
    validate_risk_config(config)?;
    validate_broker_config(config)?;
    Ok(())
}

fn init_tracing(config: &dyn ConfigPort) {
    use tracing_subscriber::EnvFilter;

    let level = config
        .get_string("logging", "level")
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json = config
        .get_string("logging", "format")
        .is_some_and(|f| f == "json");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    // Already-set subscribers (tests) are fine.
    let _ = result;
}

/// Symbol precedence: CLI flag, then `[engine] symbol`.
pub fn resolve_symbol(symbol_override: Option<&str>, config: &dyn ConfigPort) -> String {
    symbol_override
        .map(|s| s.to_string())
        .or_else(|| config.get_string("engine", "symbol"))
        .unwrap_or_default()
        .trim()
        .to_uppercase()
}

pub fn build_history_period(config: &dyn ConfigPort) -> Result<Duration, EngineError> {
    let period = config
        .get_string("engine", "history_period")
        .unwrap_or_else(|| "6mo".to_string());
    parse_history_period(&period).ok_or_else(|| EngineError::ConfigInvalid {
        section: "engine".to_string(),
        key: "history_period".to_string(),
        reason: format!("invalid period '{period}'"),
    })
}

pub fn build_strategy(config: &dyn ConfigPort) -> Result<MovingAverageCrossover, EngineError> {
    let short = config.get_int("strategy", "short_window", 20).max(0) as usize;
    let long = config.get_int("strategy", "long_window", 50).max(0) as usize;
    MovingAverageCrossover::new(short, long)
}

pub fn build_risk_engine(config: &dyn ConfigPort) -> RiskEngine {
    RiskEngine::new(
        config.get_double("risk", "max_capital_per_position", 0.05),
        config.get_int("risk", "max_trades_per_day", 2).max(0) as u32,
        config.get_double("risk", "stop_loss_pct", 0.02),
        config.get_double("risk", "max_daily_loss_pct", 0.03),
    )
}

fn build_data_port(config: &dyn ConfigPort) -> Box<dyn MarketDataPort> {
    let source = config
        .get_string("engine", "data_source")
        .unwrap_or_else(|| "yahoo".to_string());
    if source == "csv" {
        let path = config.get_string("engine", "csv_path").unwrap_or_default();
        Box::new(CsvDataAdapter::new(PathBuf::from(path)))
    } else {
        Box::new(YahooDataAdapter::new())
    }
}

fn build_broker(config: &dyn ConfigPort) -> Result<AlpacaAdapter, EngineError> {
    let base_url = config
        .get_string("broker", "base_url")
        .unwrap_or_else(|| PAPER_BASE_URL.to_string());
    let retry = RetryPolicy {
        max_attempts: config.get_int("broker", "max_retries", 3).max(1) as u32,
        delay: StdDuration::from_secs_f64(
            config.get_double("broker", "retry_wait_secs", 1.5).max(0.0),
        ),
    };
    let api_key = std::env::var("ALPACA_API_KEY").unwrap_or_default();
    let secret_key = std::env::var("ALPACA_SECRET_KEY").unwrap_or_default();
    AlpacaAdapter::new(&base_url, &api_key, &secret_key, retry)
}

/// One full decision cycle over injected ports.
///
/// Fetch history, generate the signal, read fresh account state, apply risk
/// limits, then hand the executor the last close. Config and data errors
/// propagate; the executor converts submission failures into a declined
/// result, so a cycle that reaches execution always returns.
pub fn run_cycle(
    data_port: &dyn MarketDataPort,
    broker: &dyn BrokerPort,
    strategy: &MovingAverageCrossover,
    risk_engine: &RiskEngine,
    symbol: &str,
    period: Duration,
) -> Result<ExecutionResult, EngineError> {
    let bars = data_port.get_ohlcv(symbol, period)?;
    info!(
        event = "market_data_loaded",
        symbol,
        rows = bars.len(),
        start = %bars.first().map(|b| b.timestamp.to_rfc3339()).unwrap_or_default(),
        end = %bars.last().map(|b| b.timestamp.to_rfc3339()).unwrap_or_default(),
    );

    let signal = strategy.generate_signal(symbol, &bars)?;
    info!(
        event = "signal_generated",
        symbol = %signal.symbol,
        signal = %signal.signal,
        confidence = signal.confidence,
        timestamp = %signal.timestamp.to_rfc3339(),
    );

    let account = broker.get_account()?;
    let open_orders = broker.get_open_orders()?;
    let today_trades = count_today_filled_trades(&open_orders);

    let decision = risk_engine.evaluate(
        signal.signal,
        account.equity,
        today_trades,
        account.daily_pnl(),
    );
    info!(
        event = "risk_decision",
        approved = decision.approved,
        reason = %decision.reason,
        max_position_value = decision.max_position_value,
        stop_loss_pct = decision.stop_loss_pct,
    );

    let last_price = bars.last().map(|b| b.close).unwrap_or(0.0);
    let executor = TradeExecutor::new(broker);
    let result = executor.execute(&signal, &decision, last_price);
    info!(
        event = "execution_result",
        executed = result.executed,
        reason = %result.reason,
        qty = result.qty,
        order_id = result.order_id.as_deref().unwrap_or(""),
    );

    Ok(result)
}

fn run_cycle_command(config_path: &PathBuf, symbol: Option<&str>, dry_run: bool) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    if dry_run {
        eprintln!("Config validated successfully (dry run, no orders placed)");
        return ExitCode::SUCCESS;
    }

    init_tracing(&config);

    let symbol = resolve_symbol(symbol, &config);
    let period = match build_history_period(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let strategy = match build_strategy(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let risk_engine = build_risk_engine(&config);
    let data_port = build_data_port(&config);
    let broker = match build_broker(&config) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match run_cycle(
        data_port.as_ref(),
        &broker,
        &strategy,
        &risk_engine,
        &symbol,
        period,
    ) {
        Ok(result) => {
            let outcome = if result.executed { "executed" } else { "declined" };
            eprintln!(
                "{symbol}: {outcome} ({}), qty {}",
                result.reason, result.qty
            );
            if let Some(order_id) = &result.order_id {
                eprintln!("order id: {order_id}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_signal(config_path: &PathBuf, symbol: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_engine_config(&config).and_then(|_| validate_strategy_config(&config))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    init_tracing(&config);

    let symbol = resolve_symbol(symbol, &config);
    let period = match build_history_period(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let strategy = match build_strategy(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = build_data_port(&config);
    let bars = match data_port.get_ohlcv(&symbol, period) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match strategy.generate_signal(&symbol, &bars) {
        Ok(signal) => {
            println!(
                "{} {} (confidence {:.2}) at {}",
                signal.symbol,
                signal.signal,
                signal.confidence,
                signal.timestamp.to_rfc3339(),
            );
            eprintln!(
                "{} bars, last close {}",
                bars.len(),
                bars.last().map(|b| b.close).unwrap_or(0.0),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_account(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_broker_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    init_tracing(&config);

    let broker = match build_broker(&config) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match broker.get_account() {
        Ok(account) => {
            println!("equity:         {:.2}", account.equity);
            println!("realized pnl:   {:.2}", account.realized_pnl);
            println!("unrealized pnl: {:.2}", account.unrealized_pnl);
            println!("daily pnl:      {:.2}", account.daily_pnl());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match validate_all(&config) {
        Ok(()) => {
            eprintln!("Config validated successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
