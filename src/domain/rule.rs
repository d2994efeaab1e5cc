//! Trading rules.
//!
//! A rule is a total boolean predicate over a bar series and an index. Rules
//! never fail during scanning: missing history, absent positions and numeric
//! edge cases all evaluate to "not satisfied".

use super::bar::BarSeries;
use super::trading::{TradeType, TradingRecord};

pub trait Rule {
    /// Whether the rule is satisfied at `index`.
    ///
    /// `record` carries the trading history for rules that depend on the open
    /// position; entry rules are evaluated without one.
    fn is_satisfied(&self, series: &BarSeries, index: usize, record: Option<&TradingRecord>)
    -> bool;

    /// Combine with another rule into a disjunction.
    fn or<R: Rule>(self, other: R) -> OrRule<Self, R>
    where
        Self: Sized,
    {
        OrRule {
            first: self,
            second: other,
        }
    }
}

/// Satisfied when either operand is.
pub struct OrRule<A: Rule, B: Rule> {
    first: A,
    second: B,
}

impl<A: Rule, B: Rule> Rule for OrRule<A, B> {
    fn is_satisfied(
        &self,
        series: &BarSeries,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> bool {
        self.first.is_satisfied(series, index, record)
            || self.second.is_satisfied(series, index, record)
    }
}

/// Satisfied when the close has moved `loss_pct` percent against the open
/// position's entry price.
pub struct StopLossRule {
    loss_pct: f64,
}

impl StopLossRule {
    pub fn new(loss_pct: f64) -> Self {
        StopLossRule { loss_pct }
    }
}

impl Rule for StopLossRule {
    fn is_satisfied(
        &self,
        series: &BarSeries,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> bool {
        let Some(entry) = record.and_then(|r| r.current_entry()) else {
            return false;
        };
        let close = series.close(index);
        let ratio = self.loss_pct / 100.0;
        match entry.trade_type {
            TradeType::Buy => close <= entry.price * (1.0 - ratio),
            TradeType::Sell => close >= entry.price * (1.0 + ratio),
        }
    }
}

/// Satisfied when the close has moved `gain_pct` percent in favor of the open
/// position's entry price.
pub struct StopGainRule {
    gain_pct: f64,
}

impl StopGainRule {
    pub fn new(gain_pct: f64) -> Self {
        StopGainRule { gain_pct }
    }
}

impl Rule for StopGainRule {
    fn is_satisfied(
        &self,
        series: &BarSeries,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> bool {
        let Some(entry) = record.and_then(|r| r.current_entry()) else {
            return false;
        };
        let close = series.close(index);
        let ratio = self.gain_pct / 100.0;
        match entry.trade_type {
            TradeType::Buy => close >= entry.price * (1.0 + ratio),
            TradeType::Sell => close <= entry.price * (1.0 - ratio),
        }
    }
}
