//! OHLCV bar aggregation.
//!
//! A [`BarSeries`] is an ordered sequence of bars with strictly increasing end
//! times. Only the last bar is mutable: it can be replaced wholesale via
//! [`BarSeries::add_bar`] or re-aggregated in place via
//! [`BarSeries::fold_trade`] while its period is still open. Bars before the
//! last are immutable once superseded.

use chrono::{DateTime, FixedOffset, TimeDelta};

use super::error::DiptraderError;

/// One OHLCV aggregation period.
///
/// Prices are undefined (NaN) until the first trade is folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Exclusive upper bound of the period.
    pub end_time: DateTime<FixedOffset>,
    pub duration: TimeDelta,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Number of trades folded into this bar.
    pub trades: u64,
}

impl Bar {
    /// An empty bar for a period that has not seen a trade yet.
    pub fn new(duration: TimeDelta, end_time: DateTime<FixedOffset>) -> Self {
        Bar {
            end_time,
            duration,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: 0.0,
            trades: 0,
        }
    }

    /// A completed bar with known prices, e.g. one loaded from a file.
    pub fn from_ohlcv(
        duration: TimeDelta,
        end_time: DateTime<FixedOffset>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Bar {
            end_time,
            duration,
            open,
            high,
            low,
            close,
            volume,
            trades: 1,
        }
    }

    pub fn begin_time(&self) -> DateTime<FixedOffset> {
        self.end_time - self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_nan()
    }

    /// Fold one trade into the bar.
    ///
    /// The first trade seeds all four prices; later trades move the close and
    /// widen high/low. Volume sign is not validated; callers filter.
    pub fn add_trade(&mut self, volume: f64, price: f64) {
        if self.is_empty() {
            self.open = price;
            self.high = price;
            self.low = price;
        } else {
            if price > self.high {
                self.high = price;
            }
            if price < self.low {
                self.low = price;
            }
        }
        self.close = price;
        self.volume += volume;
        self.trades += 1;
    }
}

/// A named, ordered sequence of bars.
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub name: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(name: impl Into<String>) -> Self {
        BarSeries {
            name: name.into(),
            bars: Vec::new(),
        }
    }

    /// Append a bar, or replace the last bar while its period is still open.
    ///
    /// The incoming bar's end time must strictly exceed the end time of the
    /// bar that will precede it: the current last bar when appending, the bar
    /// two positions back when replacing.
    pub fn add_bar(&mut self, bar: Bar, replace: bool) -> Result<(), DiptraderError> {
        let replacing = replace && !self.bars.is_empty();
        let prev_index = if replacing {
            self.bars.len().checked_sub(2)
        } else {
            self.bars.len().checked_sub(1)
        };

        if let Some(i) = prev_index {
            let prev = &self.bars[i];
            if bar.end_time <= prev.end_time {
                return Err(DiptraderError::NonChronologicalBar {
                    end_time: bar.end_time,
                    last_end_time: prev.end_time,
                });
            }
        }

        if replacing {
            self.bars.pop();
        }
        self.bars.push(bar);
        Ok(())
    }

    /// Fold a trade into the current (last) bar in place.
    pub fn fold_trade(&mut self, volume: f64, price: f64) -> Result<(), DiptraderError> {
        match self.bars.last_mut() {
            Some(bar) => {
                bar.add_trade(volume, price);
                Ok(())
            }
            None => Err(DiptraderError::EmptySeries),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, index: usize) -> &Bar {
        &self.bars[index]
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last_bar(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Index of the last bar, if any.
    pub fn end_index(&self) -> Option<usize> {
        self.bars.len().checked_sub(1)
    }

    pub fn close(&self, index: usize) -> f64 {
        self.bars[index].close
    }
}
