//! Backtest replay engine.
//!
//! Per (stock, day, scanner) the replay is strictly sequential — each
//! evaluation sees only already-seen history. The outer product of stocks,
//! scanners, and days is embarrassingly parallel and is fanned out by the
//! runner crate.

pub mod daily;
pub mod forward;
pub mod replay;
pub mod resample;
pub mod result;
pub mod session;
pub mod warmup;

pub use daily::{replay_daily, DAILY_HORIZONS, DAILY_MIN_CANDLES, DAILY_WARMUP};
pub use forward::{forward_returns, INTRADAY_HORIZONS};
pub use replay::replay_day;
pub use resample::{resample, ResampledBar};
pub use result::{BacktestResult, Excursion, HorizonReturn, ResultKey, SuccessFlags};
pub use session::{trading_days, SessionHours, TradingDay};
pub use warmup::WarmupState;

use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;

/// Replay parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub timeframe: Timeframe,
    /// 1-minute bars required before the first evaluation of a day.
    pub warmup_bars: usize,
    /// Resampled bars skipped before evaluating on M3/M5.
    pub resampled_warmup_bars: usize,
    /// Minimum minutes between two triggers of the same (scanner, stock).
    pub min_trigger_gap_minutes: usize,
    pub session: SessionHours,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::M1,
            warmup_bars: 50,
            resampled_warmup_bars: 20,
            min_trigger_gap_minutes: 30,
            session: SessionHours::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_timeframe(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_replay_contract() {
        let config = EngineConfig::default();
        assert_eq!(config.warmup_bars, 50);
        assert_eq!(config.min_trigger_gap_minutes, 30);
        assert_eq!(config.timeframe, Timeframe::M1);
    }

    #[test]
    fn config_roundtrips_through_serde() {
        let config = EngineConfig::with_timeframe(Timeframe::M5);
        let json = serde_json::to_string(&config).unwrap();
        let deser: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.timeframe, Timeframe::M5);
    }
}
