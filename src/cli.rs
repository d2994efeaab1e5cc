//! CLI definition and dispatch.

use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarsAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::bar::{Bar, BarSeries};
use crate::domain::config_validation::{
    parse_utc_offset, require_double, require_int, validate_backtest_config, validate_data_config,
    validate_sweep_config,
};
use crate::domain::error::DiptraderError;
use crate::domain::report::TradingStatement;
use crate::domain::runner;
use crate::domain::strategy::build_strategy;
use crate::domain::sweep::{run_sweep, SweepGrid};
use crate::domain::trading::{TradeType, TradingRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DEFAULT_UTC_OFFSET: &str = "+00:00";
pub const DEFAULT_BAR_MINUTES: i64 = 5;

#[derive(Parser, Debug)]
#[command(name = "diptrader", about = "Drawdown-entry strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sweep a parameter grid and rank the results
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a single strategy over the series
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        threshold_pct: Option<f64>,
        #[arg(long)]
        lookback: Option<usize>,
    },
    /// Re-feed the series tick by tick through a live aggregator
    Replay {
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
        Command::Sweep { config, output } => run_sweep_command(&config, output.as_ref()),
        Command::Backtest {
            config,
            threshold_pct,
            lookback,
        } => run_backtest_command(&config, threshold_pct, lookback),
        Command::Replay { config } => run_replay_command(&config),
        Command::Validate { config } => run_validate_command(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = DiptraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: DiptraderError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

/// Single-run parameters from `[backtest]`, with CLI flag overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestParams {
    pub threshold_pct: f64,
    pub lookback: usize,
    pub amount: f64,
    pub trade_type: TradeType,
}

pub fn build_backtest_params(
    config: &dyn ConfigPort,
    threshold_override: Option<f64>,
    lookback_override: Option<usize>,
) -> Result<BacktestParams, DiptraderError> {
    let amount = build_amount(config)?;
    let trade_type = build_trade_type(config)?;

    let threshold_pct = match threshold_override {
        Some(value) => value,
        None => require_double(config, "backtest", "threshold_pct")?,
    };
    let lookback = match lookback_override {
        Some(value) => value,
        None => {
            let value = require_int(config, "backtest", "lookback")?;
            if value < 1 {
                return Err(DiptraderError::ConfigInvalid {
                    section: "backtest".into(),
                    key: "lookback".into(),
                    reason: "lookback must be at least 1".into(),
                });
            }
            value as usize
        }
    };

    Ok(BacktestParams {
        threshold_pct,
        lookback,
        amount,
        trade_type,
    })
}

pub fn build_amount(config: &dyn ConfigPort) -> Result<f64, DiptraderError> {
    let amount = config.get_double("backtest", "amount", 1.0);
    if amount <= 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "amount".into(),
            reason: "amount must be positive".into(),
        });
    }
    Ok(amount)
}

pub fn build_trade_type(config: &dyn ConfigPort) -> Result<TradeType, DiptraderError> {
    let raw = config
        .get_string("backtest", "trade_type")
        .unwrap_or_else(|| "buy".to_string());
    match raw.to_lowercase().as_str() {
        "buy" => Ok(TradeType::Buy),
        "sell" => Ok(TradeType::Sell),
        _ => Err(DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "trade_type".into(),
            reason: format!("expected buy or sell, got {raw}"),
        }),
    }
}

pub fn build_sweep_grid(config: &dyn ConfigPort) -> Result<SweepGrid, DiptraderError> {
    validate_sweep_config(config)?;
    Ok(SweepGrid {
        threshold_min: require_double(config, "sweep", "threshold_min")?,
        threshold_max: require_double(config, "sweep", "threshold_max")?,
        threshold_step: require_double(config, "sweep", "threshold_step")?,
        lookback_min: require_int(config, "sweep", "lookback_min")? as usize,
        lookback_max: require_int(config, "sweep", "lookback_max")? as usize,
        lookback_step: require_int(config, "sweep", "lookback_step")? as usize,
    })
}

pub fn build_csv_adapter(config: &dyn ConfigPort) -> Result<CsvBarsAdapter, DiptraderError> {
    validate_data_config(config)?;

    let csv = config
        .get_string("data", "csv")
        .ok_or_else(|| DiptraderError::ConfigMissing {
            section: "data".into(),
            key: "csv".into(),
        })?;
    let series_name = config
        .get_string("data", "series_name")
        .or_else(|| {
            Path::new(&csv)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "series".to_string());
    let datetime_format = config
        .get_string("data", "datetime_format")
        .unwrap_or_else(|| DEFAULT_DATETIME_FORMAT.to_string());
    let offset_raw = config
        .get_string("data", "utc_offset")
        .unwrap_or_else(|| DEFAULT_UTC_OFFSET.to_string());
    let utc_offset =
        parse_utc_offset(&offset_raw).ok_or_else(|| DiptraderError::ConfigInvalid {
            section: "data".into(),
            key: "utc_offset".into(),
            reason: format!("expected ±HH:MM, got {offset_raw}"),
        })?;
    let bar_minutes = config.get_int("data", "bar_minutes", DEFAULT_BAR_MINUTES);

    Ok(CsvBarsAdapter::new(
        PathBuf::from(csv),
        series_name,
        datetime_format,
        utc_offset,
        TimeDelta::minutes(bar_minutes),
    ))
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, DiptraderError> {
    match path {
        Some(p) => Ok(Box::new(File::create(p)?)),
        None => Ok(Box::new(io::stdout())),
    }
}

fn run_sweep_command(config_path: &PathBuf, output_path: Option<&PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let grid = match build_sweep_grid(&config) {
        Ok(g) => g,
        Err(e) => return fail(e),
    };
    let amount = match build_amount(&config) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    let trade_type = match build_trade_type(&config) {
        Ok(t) => t,
        Err(e) => return fail(e),
    };

    let adapter = match build_csv_adapter(&config) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    let series = match adapter.load_series() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    eprintln!("Loaded {} bars for {}", series.len(), series.name);

    let results = match run_sweep(&series, &grid, trade_type, amount) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    eprintln!("Ranked {} strategies", results.len());

    let mut out = match open_output(output_path) {
        Ok(o) => o,
        Err(e) => return fail(e),
    };
    if let Err(e) = TextReportAdapter::new().write_sweep(&results, &mut out) {
        return fail(e);
    }
    ExitCode::SUCCESS
}

fn run_backtest_command(
    config_path: &PathBuf,
    threshold_override: Option<f64>,
    lookback_override: Option<usize>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let params = match build_backtest_params(&config, threshold_override, lookback_override) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let adapter = match build_csv_adapter(&config) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    let series = match adapter.load_series() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    eprintln!("Loaded {} bars for {}", series.len(), series.name);

    let name = format!(
        "down percent:{} count:{}",
        params.threshold_pct, params.lookback
    );
    let statement = match run_single(&series, &name, &params) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let mut out = io::stdout();
    if let Err(e) = TextReportAdapter::new().write_statement(&statement, &mut out) {
        return fail(e);
    }
    ExitCode::SUCCESS
}

fn run_single(
    series: &BarSeries,
    name: &str,
    params: &BacktestParams,
) -> Result<TradingStatement, DiptraderError> {
    let strategy = build_strategy(name, series, params.threshold_pct, params.lookback)?;
    let record = runner::run(series, &strategy, params.trade_type, params.amount)?;
    Ok(TradingStatement::from_record(name, &record))
}

fn run_replay_command(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let params = match build_backtest_params(&config, None, None) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let adapter = match build_csv_adapter(&config) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    let source = match adapter.load_series() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    eprintln!("Replaying {} bars for {}", source.len(), source.name);

    let statement = match replay_series(&source, &params) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let mut out = io::stdout();
    if let Err(e) = TextReportAdapter::new().write_statement(&statement, &mut out) {
        return fail(e);
    }
    ExitCode::SUCCESS
}

/// Re-feed a recorded series through a fresh aggregator one trade at a time.
///
/// Each source bar becomes four ticks (open, high, low, close). The first
/// tick of a period appends a new bar; every later tick re-aggregates the
/// working bar and replaces the open bar in place. The strategy is rebuilt on
/// every tick and trades at the live edge of the growing series.
pub fn replay_series(
    source: &BarSeries,
    params: &BacktestParams,
) -> Result<TradingStatement, DiptraderError> {
    let name = format!(
        "down percent:{} count:{}",
        params.threshold_pct, params.lookback
    );
    let mut live = BarSeries::new(source.name.clone());
    let mut record = TradingRecord::new(params.trade_type);

    for source_bar in source.bars() {
        let mut working = Bar::new(source_bar.duration, source_bar.end_time);
        let mut replace = false;
        for price in [
            source_bar.open,
            source_bar.high,
            source_bar.low,
            source_bar.close,
        ] {
            working.add_trade(source_bar.volume, price);
            live.add_bar(working.clone(), replace)?;
            replace = true;

            let strategy =
                build_strategy(name.as_str(), &live, params.threshold_pct, params.lookback)?;
            let Some(end_index) = live.end_index() else {
                continue;
            };
            let close = live.close(end_index);

            if strategy.should_enter(&live, end_index) {
                if record.enter(end_index, close, params.amount) {
                    eprintln!("Entered on {end_index} (price={close}, amount={})", params.amount);
                }
            } else if strategy.should_exit(&live, end_index, &record)
                && record.exit(end_index, close, params.amount)
            {
                eprintln!("Exited on {end_index} (price={close}, amount={})", params.amount);
            }
        }
    }

    Ok(TradingStatement::from_record(name, &record))
}

fn run_validate_command(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_data_config(&config) {
        return fail(e);
    }
    if config.get_string("sweep", "threshold_min").is_some() {
        if let Err(e) = validate_sweep_config(&config) {
            return fail(e);
        }
    }
    if config.get_string("backtest", "threshold_pct").is_some() {
        if let Err(e) = validate_backtest_config(&config) {
            return fail(e);
        }
    }

    eprintln!("Configuration OK");
    ExitCode::SUCCESS
}
