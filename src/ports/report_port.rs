//! Report output port trait.

use std::io::Write;

use crate::domain::error::DiptraderError;
use crate::domain::report::TradingStatement;
use crate::domain::sweep::SweepResult;

/// Port for writing run statements and ranked sweep results.
pub trait ReportPort {
    fn write_statement(
        &self,
        statement: &TradingStatement,
        out: &mut dyn Write,
    ) -> Result<(), DiptraderError>;

    fn write_sweep(
        &self,
        results: &[SweepResult],
        out: &mut dyn Write,
    ) -> Result<(), DiptraderError>;
}
