//! CSV file bar-series adapter.
//!
//! Rows are `timestamp,open,high,low,close,volume` with a header line. The
//! timestamp is the bar's end time, parsed with the configured format and
//! placed at the configured UTC offset. Bars enter the series through
//! [`BarSeries::add_bar`], so out-of-order rows are rejected by the series'
//! chronology guard.

use chrono::{FixedOffset, NaiveDateTime, TimeDelta};
use std::path::PathBuf;

use crate::domain::bar::{Bar, BarSeries};
use crate::domain::error::DiptraderError;
use crate::ports::data_port::DataPort;

#[derive(Debug)]
pub struct CsvBarsAdapter {
    path: PathBuf,
    series_name: String,
    datetime_format: String,
    utc_offset: FixedOffset,
    bar_duration: TimeDelta,
}

impl CsvBarsAdapter {
    pub fn new(
        path: PathBuf,
        series_name: impl Into<String>,
        datetime_format: impl Into<String>,
        utc_offset: FixedOffset,
        bar_duration: TimeDelta,
    ) -> Self {
        Self {
            path,
            series_name: series_name.into(),
            datetime_format: datetime_format.into(),
            utc_offset,
            bar_duration,
        }
    }

    fn parse_end_time(
        &self,
        raw: &str,
    ) -> Result<chrono::DateTime<FixedOffset>, DiptraderError> {
        let naive = NaiveDateTime::parse_from_str(raw, &self.datetime_format).map_err(|e| {
            DiptraderError::Data {
                reason: format!("invalid timestamp {raw:?}: {e}"),
            }
        })?;
        naive
            .and_local_timezone(self.utc_offset)
            .single()
            .ok_or_else(|| DiptraderError::Data {
                reason: format!("timestamp {raw:?} is not a valid instant at the configured offset"),
            })
    }
}

impl DataPort for CsvBarsAdapter {
    fn load_series(&self) -> Result<BarSeries, DiptraderError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| DiptraderError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut series = BarSeries::new(self.series_name.clone());

        for result in rdr.records() {
            let record = result.map_err(|e| DiptraderError::Data {
                reason: format!("CSV parse error: {e}"),
            })?;

            let raw_time = record.get(0).ok_or_else(|| DiptraderError::Data {
                reason: "missing timestamp column".into(),
            })?;
            let end_time = self.parse_end_time(raw_time)?;

            let open = parse_field(&record, 1, "open")?;
            let high = parse_field(&record, 2, "high")?;
            let low = parse_field(&record, 3, "low")?;
            let close = parse_field(&record, 4, "close")?;
            let volume = parse_field(&record, 5, "volume")?;

            let bar = Bar::from_ohlcv(self.bar_duration, end_time, open, high, low, close, volume);
            series.add_bar(bar, false)?;
        }

        Ok(series)
    }
}

fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, DiptraderError> {
    record
        .get(index)
        .ok_or_else(|| DiptraderError::Data {
            reason: format!("missing {name} column"),
        })?
        .parse()
        .map_err(|e| DiptraderError::Data {
            reason: format!("invalid {name} value: {e}"),
        })
}
