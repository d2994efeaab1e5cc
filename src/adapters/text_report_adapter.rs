//! Plain-text report adapter.

use std::io::Write;

use crate::domain::error::DiptraderError;
use crate::domain::report::TradingStatement;
use crate::domain::sweep::SweepResult;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        TextReportAdapter
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TextReportAdapter {
    fn write_statement(
        &self,
        statement: &TradingStatement,
        out: &mut dyn Write,
    ) -> Result<(), DiptraderError> {
        writeln!(out, "strategy: {}", statement.strategy_name)?;
        writeln!(
            out,
            "  total profit/loss:   {}",
            statement.performance.total_profit_loss
        )?;
        writeln!(
            out,
            "  total profit/loss %: {}",
            statement.performance.total_profit_loss_pct
        )?;
        writeln!(
            out,
            "  total profit:        {}",
            statement.performance.total_profit
        )?;
        writeln!(
            out,
            "  total loss:          {}",
            statement.performance.total_loss
        )?;
        writeln!(
            out,
            "  gross return:        {}",
            statement.performance.gross_return
        )?;
        writeln!(
            out,
            "  profit count:        {}",
            statement.position_stats.profit_count
        )?;
        writeln!(
            out,
            "  loss count:          {}",
            statement.position_stats.loss_count
        )?;
        writeln!(
            out,
            "  break-even count:    {}",
            statement.position_stats.break_even_count
        )?;
        Ok(())
    }

    fn write_sweep(
        &self,
        results: &[SweepResult],
        out: &mut dyn Write,
    ) -> Result<(), DiptraderError> {
        writeln!(out, "{} strategies, ranked by total profit/loss %", results.len())?;
        for (rank, result) in results.iter().enumerate() {
            writeln!(out)?;
            writeln!(
                out,
                "#{} threshold {}% lookback {}",
                rank + 1,
                result.threshold_pct,
                result.lookback
            )?;
            self.write_statement(&result.statement, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{PerformanceReport, PositionStatsReport};

    fn statement(name: &str, pct: f64) -> TradingStatement {
        TradingStatement {
            strategy_name: name.to_string(),
            performance: PerformanceReport {
                total_profit_loss: 80.0,
                total_profit_loss_pct: pct,
                total_profit: 100.0,
                total_loss: -20.0,
                gross_return: 1.08,
            },
            position_stats: PositionStatsReport {
                profit_count: 2,
                loss_count: 1,
                break_even_count: 0,
            },
        }
    }

    #[test]
    fn statement_lists_all_figures() {
        let mut out = Vec::new();
        TextReportAdapter::new()
            .write_statement(&statement("down percent:0.8 count:13", 13.0), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("strategy: down percent:0.8 count:13"));
        assert!(text.contains("total profit/loss:   80"));
        assert!(text.contains("total profit/loss %: 13"));
        assert!(text.contains("total loss:          -20"));
        assert!(text.contains("profit count:        2"));
        assert!(text.contains("loss count:          1"));
    }

    #[test]
    fn sweep_output_is_ranked() {
        let results = vec![
            SweepResult {
                threshold_pct: 0.8,
                lookback: 13,
                statement: statement("down percent:0.8 count:13", 13.0),
            },
            SweepResult {
                threshold_pct: 1.3,
                lookback: 7,
                statement: statement("down percent:1.3 count:7", 7.0),
            },
        ];
        let mut out = Vec::new();
        TextReportAdapter::new().write_sweep(&results, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("2 strategies"));
        let first = text.find("#1 threshold 0.8% lookback 13").unwrap();
        let second = text.find("#2 threshold 1.3% lookback 7").unwrap();
        assert!(first < second);
    }
}
