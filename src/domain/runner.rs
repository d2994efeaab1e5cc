//! Strategy replay over a bar series.

use super::bar::BarSeries;
use super::error::DiptraderError;
use super::strategy::Strategy;
use super::trading::{TradeType, TradingRecord};

/// Replay `strategy` over the whole series, trading at close prices.
///
/// Scans indices in order, deciding entry while flat and exit while a
/// position is open, using only bars up to and including the current index.
/// A position still open at the end of the series is left open.
pub fn run(
    series: &BarSeries,
    strategy: &Strategy,
    trade_type: TradeType,
    amount: f64,
) -> Result<TradingRecord, DiptraderError> {
    if series.is_empty() {
        return Err(DiptraderError::EmptySeries);
    }

    let mut record = TradingRecord::new(trade_type);
    for index in 0..series.len() {
        if record.is_open() {
            if strategy.should_exit(series, index, &record) {
                record.exit(index, series.close(index), amount);
            }
        } else if strategy.should_enter(series, index) {
            record.enter(index, series.close(index), amount);
        }
    }
    Ok(record)
}
