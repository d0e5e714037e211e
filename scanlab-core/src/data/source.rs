//! In-memory candle source backing the CSV and synthetic pipelines.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::data::ingest::{load_csv_dir, LoadError};
use crate::data::provider::{CandleSource, DataError};
use crate::domain::{Candle, Timeframe};

/// Candle source serving pre-loaded series from memory.
///
/// The timeframe parameter is ignored on lookup: the store holds whatever
/// granularity it was loaded with, and the caller picks instruments
/// accordingly (1-minute files for intraday runs, daily files for daily
/// runs).
#[derive(Debug, Default)]
pub struct MemoryCandleSource {
    series: BTreeMap<String, Vec<Candle>>,
}

impl MemoryCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every CSV file in a directory, one instrument per file.
    pub fn from_csv_dir(dir: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            series: load_csv_dir(dir)?,
        })
    }

    pub fn insert(&mut self, instrument: impl Into<String>, candles: Vec<Candle>) {
        self.series.insert(instrument.into(), candles);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl CandleSource for MemoryCandleSource {
    fn candles(
        &self,
        instrument: &str,
        _timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, DataError> {
        let series = self
            .series
            .get(instrument)
            .ok_or_else(|| DataError::UnknownInstrument(instrument.to_string()))?;

        Ok(series
            .iter()
            .filter(|c| c.timestamp >= start && c.timestamp <= end)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{minute_series, SyntheticConfig};
    use chrono::NaiveDate;

    #[test]
    fn serves_range_slices() {
        let config = SyntheticConfig::default();
        let candles = minute_series(3, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2, &config);
        let day_two_start = candles
            .iter()
            .find(|c| c.timestamp.date_naive() == NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
            .unwrap()
            .timestamp;

        let mut source = MemoryCandleSource::new();
        source.insert("SYN", candles.clone());

        let all = source
            .candles("SYN", Timeframe::M1, candles[0].timestamp, candles.last().unwrap().timestamp)
            .unwrap();
        assert_eq!(all.len(), candles.len());

        let day_two = source
            .candles("SYN", Timeframe::M1, day_two_start, candles.last().unwrap().timestamp)
            .unwrap();
        assert!(day_two.len() < all.len());
        assert!(day_two.iter().all(|c| c.timestamp >= day_two_start));
    }

    #[test]
    fn unknown_instrument_errors() {
        let source = MemoryCandleSource::new();
        let now = Utc::now();
        assert!(matches!(
            source.candles("NOPE", Timeframe::M1, now, now),
            Err(DataError::UnknownInstrument(_))
        ));
    }
}
