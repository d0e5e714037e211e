//! Candle — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single instrument at a single timestamp.
///
/// Candles are immutable once produced by a data source; the engine never
/// mutates them. Volume is fractional-capable because resampled and
/// vendor-supplied series both arrive that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Basic OHLCV sanity check: high bounds the body from above, low from
    /// below, prices positive, volume non-negative.
    pub fn is_sane(&self) -> bool {
        !self.open.is_nan()
            && !self.high.is_nan()
            && !self.low.is_nan()
            && !self.close.is_nan()
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// Absolute body height, |close - open|.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// True if the candle closed above its open.
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }
}

/// Bar size the engine evaluates scanners on.
///
/// Intraday modes resample from 1-minute source bars; `Daily` operates on
/// day-level candles directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    M1,
    M3,
    M5,
    Daily,
}

impl Timeframe {
    /// Bar length in minutes (a trading day for `Daily`).
    pub fn minutes(&self) -> u32 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M3 => 3,
            Timeframe::M5 => 5,
            Timeframe::Daily => 1440,
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, Timeframe::Daily)
    }
}

/// Identifier of a scanner rule. Values follow the catalog numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScannerId(pub u16);

impl std::fmt::Display for ScannerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Violations detected by [`validate_series`].
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("candle {index} is not sane (ohlcv bounds violated)")]
    InsaneCandle { index: usize },
    #[error("timestamps not strictly increasing at index {index}")]
    OutOfOrder { index: usize },
}

/// Validate an ingested series: every candle sane, timestamps strictly
/// increasing (which also rules out duplicates).
pub fn validate_series(candles: &[Candle]) -> Result<(), SeriesError> {
    for (i, c) in candles.iter().enumerate() {
        if !c.is_sane() {
            return Err(SeriesError::InsaneCandle { index: i });
        }
        if i > 0 && c.timestamp <= candles[i - 1].timestamp {
            return Err(SeriesError::OutOfOrder { index: i });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 9, 15, 0).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        let mut c = sample_candle();
        c.high = 97.0; // below low
        assert!(!c.is_sane());
    }

    #[test]
    fn candle_detects_nan() {
        let mut c = sample_candle();
        c.close = f64::NAN;
        assert!(!c.is_sane());
    }

    #[test]
    fn candle_body_and_color() {
        let c = sample_candle();
        assert_eq!(c.body(), 3.0);
        assert!(c.is_green());
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let c = sample_candle();
        let json = serde_json::to_string(&c).unwrap();
        let deser: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(c, deser);
    }

    #[test]
    fn validate_rejects_out_of_order() {
        let a = sample_candle();
        let mut b = sample_candle();
        b.timestamp = a.timestamp; // duplicate
        assert_eq!(
            validate_series(&[a, b]),
            Err(SeriesError::OutOfOrder { index: 1 })
        );
    }

    #[test]
    fn validate_accepts_ordered_series() {
        let a = sample_candle();
        let mut b = sample_candle();
        b.timestamp = a.timestamp + chrono::Duration::minutes(1);
        assert_eq!(validate_series(&[a, b]), Ok(()));
    }

    #[test]
    fn timeframe_minutes() {
        assert_eq!(Timeframe::M1.minutes(), 1);
        assert_eq!(Timeframe::M5.minutes(), 5);
        assert!(!Timeframe::Daily.is_intraday());
    }
}
