//! Domain error types.

use chrono::{DateTime, FixedOffset};

/// Top-level error type for diptrader.
#[derive(Debug, thiserror::Error)]
pub enum DiptraderError {
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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("series has no bars")]
    EmptySeries,

    #[error("bar end time {end_time} does not advance past {last_end_time}")]
    NonChronologicalBar {
        end_time: DateTime<FixedOffset>,
        last_end_time: DateTime<FixedOffset>,
    },

    #[error("invalid sweep grid: {reason}")]
    InvalidGrid { reason: String },

    #[error("strategy (threshold {threshold_pct}%, lookback {lookback}) failed: {source}")]
    Execution {
        threshold_pct: f64,
        lookback: usize,
        source: Box<DiptraderError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DiptraderError> for std::process::ExitCode {
    fn from(err: &DiptraderError) -> Self {
        let code: u8 = match err {
            DiptraderError::Io(_) => 1,
            DiptraderError::ConfigParse { .. }
            | DiptraderError::ConfigMissing { .. }
            | DiptraderError::ConfigInvalid { .. } => 2,
            DiptraderError::Data { .. } => 3,
            DiptraderError::EmptySeries
            | DiptraderError::NonChronologicalBar { .. }
            | DiptraderError::InvalidGrid { .. } => 4,
            DiptraderError::Execution { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
