//! Seeded synthetic candle generation.
//!
//! A geometric random walk with intraday volume shape, used by the CLI demo
//! mode and by tests that need multi-day minute data. Deterministic for a
//! given seed.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Candle;

/// Parameters of the generated walk.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub start_price: f64,
    /// Per-minute return stddev, as a fraction.
    pub volatility: f64,
    /// Per-minute drift, as a fraction.
    pub drift: f64,
    pub base_volume: f64,
    pub session_open: NaiveTime,
    pub session_close: NaiveTime,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            volatility: 0.0008,
            drift: 0.00001,
            base_volume: 10_000.0,
            session_open: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            session_close: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
        }
    }
}

/// Generate 1-minute session candles for consecutive weekdays starting at
/// `first_day`. The walk continues across days (no overnight reset).
pub fn minute_series(
    seed: u64,
    first_day: NaiveDate,
    trading_days: usize,
    config: &SyntheticConfig,
) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = config.start_price;
    let mut candles = Vec::new();

    let mut day = first_day;
    let mut days_done = 0;
    while days_done < trading_days {
        if is_weekday(day) {
            let mut ts = day.and_time(config.session_open).and_utc();
            let close_ts = day.and_time(config.session_close).and_utc();
            while ts <= close_ts {
                candles.push(next_candle(&mut rng, &mut price, ts, config));
                ts += Duration::minutes(1);
            }
            days_done += 1;
        }
        day += Duration::days(1);
    }

    candles
}

fn next_candle(
    rng: &mut StdRng,
    price: &mut f64,
    timestamp: DateTime<Utc>,
    config: &SyntheticConfig,
) -> Candle {
    let open = *price;
    // Sum of two uniforms approximates a bell around the drift
    let shock = (rng.gen::<f64>() + rng.gen::<f64>() - 1.0) * config.volatility * 2.0;
    let close = open * (1.0 + config.drift + shock);
    let wick = open.max(close) * rng.gen::<f64>() * config.volatility;
    let high = open.max(close) + wick;
    let low = (open.min(close) - wick).max(0.01);
    // Volume clusters with the size of the move
    let volume = config.base_volume * (0.5 + rng.gen::<f64>() + shock.abs() / config.volatility);

    *price = close;
    Candle {
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    }
}

fn is_weekday(day: NaiveDate) -> bool {
    use chrono::Datelike;
    day.weekday().num_days_from_monday() < 5
}
