//! Parameter-grid backtest sweep.
//!
//! Explores a 2-D grid of (threshold percent, lookback) pairs, replays one
//! strategy per grid point over the same series, and ranks the results by
//! total profit-loss percentage.

use std::cmp::Ordering;

use super::bar::BarSeries;
use super::error::DiptraderError;
use super::report::TradingStatement;
use super::runner;
use super::strategy::build_strategy;
use super::trading::TradeType;

/// Bounds and steps of the parameter grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    pub threshold_min: f64,
    pub threshold_max: f64,
    pub threshold_step: f64,
    pub lookback_min: usize,
    pub lookback_max: usize,
    pub lookback_step: usize,
}

impl SweepGrid {
    pub fn validate(&self) -> Result<(), DiptraderError> {
        if !self.threshold_min.is_finite()
            || !self.threshold_max.is_finite()
            || !self.threshold_step.is_finite()
        {
            return Err(DiptraderError::InvalidGrid {
                reason: "threshold bounds must be finite".into(),
            });
        }
        if self.threshold_min > self.threshold_max {
            return Err(DiptraderError::InvalidGrid {
                reason: format!(
                    "threshold_min {} exceeds threshold_max {}",
                    self.threshold_min, self.threshold_max
                ),
            });
        }
        if self.threshold_step <= 0.0 {
            return Err(DiptraderError::InvalidGrid {
                reason: "threshold_step must be positive".into(),
            });
        }
        if self.lookback_min > self.lookback_max {
            return Err(DiptraderError::InvalidGrid {
                reason: format!(
                    "lookback_min {} exceeds lookback_max {}",
                    self.lookback_min, self.lookback_max
                ),
            });
        }
        if self.lookback_step == 0 {
            return Err(DiptraderError::InvalidGrid {
                reason: "lookback_step must be positive".into(),
            });
        }
        Ok(())
    }
}

/// One ranked grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub threshold_pct: f64,
    pub lookback: usize,
    pub statement: TradingStatement,
}

/// Run the full sweep and rank the results.
///
/// The threshold axis advances by floating-point accumulation, exactly as
/// configured; the drifted values are part of the explored grid and appear
/// verbatim in strategy names. A failing grid point aborts the whole sweep,
/// wrapped with its parameter pair.
pub fn run_sweep(
    series: &BarSeries,
    grid: &SweepGrid,
    trade_type: TradeType,
    amount: f64,
) -> Result<Vec<SweepResult>, DiptraderError> {
    grid.validate()?;

    let mut results = Vec::new();
    let mut threshold = grid.threshold_min;
    while threshold <= grid.threshold_max {
        let mut lookback = grid.lookback_min;
        while lookback <= grid.lookback_max {
            let statement = run_point(series, threshold, lookback, trade_type, amount).map_err(
                |source| DiptraderError::Execution {
                    threshold_pct: threshold,
                    lookback,
                    source: Box::new(source),
                },
            )?;
            results.push(SweepResult {
                threshold_pct: threshold,
                lookback,
                statement,
            });
            lookback += grid.lookback_step;
        }
        threshold += grid.threshold_step;
    }

    rank(&mut results);
    Ok(results)
}

fn run_point(
    series: &BarSeries,
    threshold_pct: f64,
    lookback: usize,
    trade_type: TradeType,
    amount: f64,
) -> Result<TradingStatement, DiptraderError> {
    let name = format!("down percent:{threshold_pct} count:{lookback}");
    let strategy = build_strategy(name.as_str(), series, threshold_pct, lookback)?;
    let record = runner::run(series, &strategy, trade_type, amount)?;
    Ok(TradingStatement::from_record(name, &record))
}

/// Stable descending sort on total profit-loss percentage; ties and NaN
/// comparisons keep grid-generation order.
fn rank(results: &mut [SweepResult]) {
    results.sort_by(|a, b| {
        b.statement
            .performance
            .total_profit_loss_pct
            .partial_cmp(&a.statement.performance.total_profit_loss_pct)
            .unwrap_or(Ordering::Equal)
    });
}
