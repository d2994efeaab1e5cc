//! Lookback-window drawdown detection.

use super::bar::BarSeries;
use super::percent::percent_diff;
use super::rule::Rule;
use super::trading::TradingRecord;

/// Satisfied when the close has fallen more than `threshold_pct` percent below
/// the maximum close observed over the last `lookback` bars.
///
/// The window `[index - lookback, index]` includes the current bar, so the
/// current close participates in its own maximum. A decline exactly equal to
/// the threshold does not satisfy the rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownRule {
    threshold_pct: f64,
    lookback: usize,
}

impl DrawdownRule {
    pub fn new(threshold_pct: f64, lookback: usize) -> Self {
        DrawdownRule {
            threshold_pct,
            lookback,
        }
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

impl Rule for DrawdownRule {
    fn is_satisfied(
        &self,
        series: &BarSeries,
        index: usize,
        _record: Option<&TradingRecord>,
    ) -> bool {
        if index <= self.lookback || index >= series.len() {
            return false;
        }

        let current = series.close(index);
        let window_max = (index - self.lookback..=index)
            .map(|i| series.close(i))
            .fold(f64::MIN, f64::max);

        if current > window_max {
            return false;
        }

        match percent_diff(current, window_max) {
            Some(diff) => diff > self.threshold_pct,
            None => false,
        }
    }
}
