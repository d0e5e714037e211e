//! Data source traits — the engine's external collaborators.
//!
//! Candle fetching and daily reference statistics are injected capabilities,
//! never ambient globals. Implementations in this workspace are limited to
//! CSV files and synthetic series; anything network-backed lives outside.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Candle, Timeframe};

/// Errors from a candle source.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data for instrument '{0}'")]
    UnknownInstrument(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies ordered OHLCV bars for an instrument/timeframe/date-range.
///
/// Implementations must return candles sorted ascending by timestamp with no
/// duplicates; the engine trusts that contract after ingest validation.
pub trait CandleSource: Send + Sync {
    fn candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, DataError>;
}

/// Daily reference statistics consumed by volume-surge and 52-week-high
/// gates. `None` answers make the gates fall back to in-window estimates.
pub trait ReferenceData: Send + Sync {
    /// Average daily volume divided by minutes per session, over a trailing
    /// number of days.
    fn volume_per_minute(&self, instrument: &str, lookback_days: u32) -> Option<f64>;

    /// Highest daily high over a trailing number of sessions, excluding the
    /// current one.
    fn rolling_high(&self, instrument: &str, lookback_days: u32) -> Option<f64>;
}

/// Reference provider that answers nothing, forcing in-window fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferenceData;

impl ReferenceData for NoReferenceData {
    fn volume_per_minute(&self, _instrument: &str, _lookback_days: u32) -> Option<f64> {
        None
    }

    fn rolling_high(&self, _instrument: &str, _lookback_days: u32) -> Option<f64> {
        None
    }
}
