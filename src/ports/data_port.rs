//! Series loading port trait.

use crate::domain::bar::BarSeries;
use crate::domain::error::DiptraderError;

pub trait DataPort {
    fn load_series(&self) -> Result<BarSeries, DiptraderError>;
}
