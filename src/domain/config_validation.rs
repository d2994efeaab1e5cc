//! Configuration validation.
//!
//! Validates config fields before any series is loaded or any sweep runs.

use chrono::FixedOffset;

use crate::domain::error::DiptraderError;
use crate::ports::config_port::ConfigPort;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    validate_csv_path(config)?;
    validate_bar_minutes(config)?;
    validate_utc_offset(config)?;
    Ok(())
}

/// Keys needed by the single-run `backtest` and `replay` commands.
pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    validate_amount(config)?;
    validate_trade_type(config)?;
    validate_threshold_pct(config)?;
    validate_lookback(config)?;
    Ok(())
}

pub fn validate_sweep_config(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    validate_amount(config)?;
    validate_trade_type(config)?;

    let threshold_min = require_double(config, "sweep", "threshold_min")?;
    let threshold_max = require_double(config, "sweep", "threshold_max")?;
    let threshold_step = require_double(config, "sweep", "threshold_step")?;
    let lookback_min = require_int(config, "sweep", "lookback_min")?;
    let lookback_max = require_int(config, "sweep", "lookback_max")?;
    let lookback_step = require_int(config, "sweep", "lookback_step")?;

    if threshold_min > threshold_max {
        return Err(DiptraderError::ConfigInvalid {
            section: "sweep".into(),
            key: "threshold_min".into(),
            reason: "threshold_min must not exceed threshold_max".into(),
        });
    }
    if threshold_step <= 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "sweep".into(),
            key: "threshold_step".into(),
            reason: "threshold_step must be positive".into(),
        });
    }
    if lookback_min < 1 {
        return Err(DiptraderError::ConfigInvalid {
            section: "sweep".into(),
            key: "lookback_min".into(),
            reason: "lookback_min must be at least 1".into(),
        });
    }
    if lookback_min > lookback_max {
        return Err(DiptraderError::ConfigInvalid {
            section: "sweep".into(),
            key: "lookback_min".into(),
            reason: "lookback_min must not exceed lookback_max".into(),
        });
    }
    if lookback_step < 1 {
        return Err(DiptraderError::ConfigInvalid {
            section: "sweep".into(),
            key: "lookback_step".into(),
            reason: "lookback_step must be at least 1".into(),
        });
    }
    Ok(())
}

/// Parse an explicit `±HH:MM` UTC offset.
///
/// The offset applied to naive CSV timestamps is configuration, not ambient
/// process state.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let (sign, rest) = match value.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn validate_csv_path(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    match config.get_string("data", "csv") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(DiptraderError::ConfigMissing {
            section: "data".into(),
            key: "csv".into(),
        }),
    }
}

fn validate_bar_minutes(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let value = config.get_int("data", "bar_minutes", 5);
    if value < 1 {
        return Err(DiptraderError::ConfigInvalid {
            section: "data".into(),
            key: "bar_minutes".into(),
            reason: "bar_minutes must be at least 1".into(),
        });
    }
    Ok(())
}

fn validate_utc_offset(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    match config.get_string("data", "utc_offset") {
        None => Ok(()),
        Some(s) => match parse_utc_offset(&s) {
            Some(_) => Ok(()),
            None => Err(DiptraderError::ConfigInvalid {
                section: "data".into(),
                key: "utc_offset".into(),
                reason: format!("expected ±HH:MM, got {s}"),
            }),
        },
    }
}

fn validate_amount(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let value = config.get_double("backtest", "amount", 1.0);
    if value <= 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "amount".into(),
            reason: "amount must be positive".into(),
        });
    }
    Ok(())
}

fn validate_trade_type(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    match config.get_string("backtest", "trade_type") {
        None => Ok(()),
        Some(s) => match s.to_lowercase().as_str() {
            "buy" | "sell" => Ok(()),
            _ => Err(DiptraderError::ConfigInvalid {
                section: "backtest".into(),
                key: "trade_type".into(),
                reason: format!("expected buy or sell, got {s}"),
            }),
        },
    }
}

fn validate_threshold_pct(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let value = require_double(config, "backtest", "threshold_pct")?;
    if !value.is_finite() || value < 0.0 {
        return Err(DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "threshold_pct".into(),
            reason: "threshold_pct must be a non-negative number".into(),
        });
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), DiptraderError> {
    let value = require_int(config, "backtest", "lookback")?;
    if value < 1 {
        return Err(DiptraderError::ConfigInvalid {
            section: "backtest".into(),
            key: "lookback".into(),
            reason: "lookback must be at least 1".into(),
        });
    }
    Ok(())
}

pub fn require_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<f64, DiptraderError> {
    let raw = config
        .get_string(section, key)
        .ok_or_else(|| DiptraderError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })?;
    raw.trim()
        .parse()
        .map_err(|_| DiptraderError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("expected a number, got {raw}"),
        })
}

pub fn require_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<i64, DiptraderError> {
    let raw = config
        .get_string(section, key)
        .ok_or_else(|| DiptraderError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })?;
    raw.trim()
        .parse()
        .map_err(|_| DiptraderError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("expected an integer, got {raw}"),
        })
}
