//! Scanner rule evaluators.
//!
//! A scanner is a pure function of a chronological candle window (plus
//! optional daily reference data) returning pass/fail and a diagnostics map.
//! Gates run in a fixed order and record their values before testing, so an
//! early failure still reports everything computed so far.

pub mod catalog;
pub mod gates;
pub mod metrics;

pub use catalog::{by_id, catalog};
pub use metrics::{MetricValue, ScanMetrics, ScanOutcome};

use crate::data::provider::ReferenceData;
use crate::domain::{Candle, ScannerId};

/// Per-evaluation context: the instrument under test and optional daily
/// reference statistics for baseline gates.
#[derive(Clone, Copy)]
pub struct ScanContext<'a> {
    pub instrument: &'a str,
    pub reference: Option<&'a dyn ReferenceData>,
}

impl<'a> ScanContext<'a> {
    pub fn new(instrument: &'a str) -> Self {
        Self {
            instrument,
            reference: None,
        }
    }

    pub fn with_reference(instrument: &'a str, reference: &'a dyn ReferenceData) -> Self {
        Self {
            instrument,
            reference: Some(reference),
        }
    }

    /// Daily volume-per-minute baseline, if a provider is attached and has
    /// an answer.
    pub fn volume_per_minute(&self, lookback_days: u32) -> Option<f64> {
        self.reference
            .and_then(|r| r.volume_per_minute(self.instrument, lookback_days))
    }

    /// Trailing-session high, if available.
    pub fn rolling_high(&self, lookback_days: u32) -> Option<f64> {
        self.reference
            .and_then(|r| r.rolling_high(self.instrument, lookback_days))
    }
}

/// A named, parametrized trading rule.
///
/// Implementations must be pure: no mutation of the window, no side effects,
/// and identical outputs for identical inputs. Windows shorter than
/// `min_bars()` fail closed with an insufficient-data error.
pub trait Scanner: Send + Sync {
    fn id(&self) -> ScannerId;

    fn name(&self) -> &str;

    /// Minimum window length the rule needs.
    fn min_bars(&self) -> usize;

    fn evaluate(&self, window: &[Candle], ctx: &ScanContext<'_>) -> ScanOutcome;
}
