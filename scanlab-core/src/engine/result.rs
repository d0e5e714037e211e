//! Backtest result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ScannerId;

/// Price and return at one fixed forward horizon. `None` values mean no
/// future data existed for the horizon search (trigger at the end of the
/// data), never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonReturn {
    pub label: String,
    pub price: Option<f64>,
    pub return_pct: Option<f64>,
}

/// Best and worst excursion after a trigger, with the timestamps at which
/// each extreme printed. Folded from the trigger price itself, so favorable
/// is never negative and adverse never positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Excursion {
    pub max_favorable_pct: f64,
    pub max_adverse_pct: f64,
    pub max_favorable_time: DateTime<Utc>,
    pub max_adverse_time: DateTime<Utc>,
}

/// Outcome flags derived from forward returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessFlags {
    /// Positive return at the fastest horizon.
    pub was_successful: bool,
    pub hit_target_1pct: bool,
    pub hit_target_2pct: bool,
    pub hit_stoploss: bool,
}

/// Unique key of a result: one trigger per (scanner, instrument, minute).
pub type ResultKey = (ScannerId, String, DateTime<Utc>);

/// One qualifying scanner trigger with its forward-looking annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub scanner_id: ScannerId,
    pub instrument: String,
    pub trigger_time: DateTime<Utc>,
    pub trigger_price: f64,
    pub horizons: Vec<HorizonReturn>,
    pub excursion: Option<Excursion>,
    pub flags: SuccessFlags,
}

impl BacktestResult {
    pub fn key(&self) -> ResultKey {
        (self.scanner_id, self.instrument.clone(), self.trigger_time)
    }

    /// Return at a named horizon, if that horizon resolved.
    pub fn return_at(&self, label: &str) -> Option<f64> {
        self.horizons
            .iter()
            .find(|h| h.label == label)
            .and_then(|h| h.return_pct)
    }
}
