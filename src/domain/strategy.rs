//! Strategy composition.

use super::bar::BarSeries;
use super::drawdown::DrawdownRule;
use super::error::DiptraderError;
use super::rule::{Rule, StopGainRule, StopLossRule};
use super::trading::TradingRecord;

/// Exit constants of the drawdown strategy family.
pub const STOP_LOSS_PCT: f64 = 1.5;
pub const STOP_GAIN_PCT: f64 = 1.0;

/// A named entry/exit rule pair.
///
/// Stateless with respect to execution: predicates are re-evaluated fresh for
/// every index, and building a strategy is cheap enough to do per tick.
pub struct Strategy {
    pub name: String,
    entry: Box<dyn Rule>,
    exit: Box<dyn Rule>,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Strategy {
    pub fn new(name: impl Into<String>, entry: Box<dyn Rule>, exit: Box<dyn Rule>) -> Self {
        Strategy {
            name: name.into(),
            entry,
            exit,
        }
    }

    pub fn should_enter(&self, series: &BarSeries, index: usize) -> bool {
        self.entry.is_satisfied(series, index, None)
    }

    pub fn should_exit(&self, series: &BarSeries, index: usize, record: &TradingRecord) -> bool {
        self.exit.is_satisfied(series, index, Some(record))
    }
}

/// Build one drawdown strategy: a [`DrawdownRule`] entry with a fixed
/// stop-loss-or-stop-gain exit.
pub fn build_strategy(
    name: impl Into<String>,
    series: &BarSeries,
    threshold_pct: f64,
    lookback: usize,
) -> Result<Strategy, DiptraderError> {
    if series.is_empty() {
        return Err(DiptraderError::EmptySeries);
    }

    let entry = DrawdownRule::new(threshold_pct, lookback);
    let exit = StopLossRule::new(STOP_LOSS_PCT).or(StopGainRule::new(STOP_GAIN_PCT));
    Ok(Strategy::new(name, Box::new(entry), Box::new(exit)))
}
