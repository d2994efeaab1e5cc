//! Performance reports computed from a trading record.
//!
//! Only closed positions are scored; a position left open at the end of a
//! replay contributes nothing.

use super::trading::TradingRecord;

/// Aggregate profit-and-loss figures for one strategy run.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    /// Sum of per-position profits, wins and losses combined.
    pub total_profit_loss: f64,
    /// Sum of per-position profit percentages (relative to entry value).
    pub total_profit_loss_pct: f64,
    /// Sum of winning positions' profits (non-negative).
    pub total_profit: f64,
    /// Sum of losing positions' losses (non-positive).
    pub total_loss: f64,
    /// Product of per-position return ratios; 1.0 with no closed positions.
    pub gross_return: f64,
}

/// Win/loss tally for one strategy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionStatsReport {
    pub profit_count: usize,
    pub loss_count: usize,
    pub break_even_count: usize,
}

/// Everything reported about one strategy run.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingStatement {
    pub strategy_name: String,
    pub performance: PerformanceReport,
    pub position_stats: PositionStatsReport,
}

impl TradingStatement {
    pub fn from_record(strategy_name: impl Into<String>, record: &TradingRecord) -> Self {
        let mut total_profit_loss = 0.0;
        let mut total_profit_loss_pct = 0.0;
        let mut total_profit = 0.0;
        let mut total_loss = 0.0;
        let mut gross_return = 1.0;
        let mut profit_count = 0;
        let mut loss_count = 0;
        let mut break_even_count = 0;

        for position in record.positions() {
            let Some(pnl) = position.profit() else {
                continue;
            };
            total_profit_loss += pnl;
            total_profit_loss_pct += position.profit_pct().unwrap_or(0.0);
            gross_return *= position.return_ratio().unwrap_or(1.0);

            if pnl > 0.0 {
                total_profit += pnl;
                profit_count += 1;
            } else if pnl < 0.0 {
                total_loss += pnl;
                loss_count += 1;
            } else {
                break_even_count += 1;
            }
        }

        TradingStatement {
            strategy_name: strategy_name.into(),
            performance: PerformanceReport {
                total_profit_loss,
                total_profit_loss_pct,
                total_profit,
                total_loss,
                gross_return,
            },
            position_stats: PositionStatsReport {
                profit_count,
                loss_count,
                break_even_count,
            },
        }
    }
}
