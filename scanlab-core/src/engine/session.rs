//! Trading session handling: splitting a minute series into per-day slices.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::Candle;

/// Regular session bounds, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for SessionHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            close: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
        }
    }
}

impl SessionHours {
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.open && time <= self.close
    }

    /// Session length in minutes, inclusive of both end bars.
    pub fn minutes(&self) -> i64 {
        (self.close - self.open).num_minutes() + 1
    }
}

/// One trading day's session candles, chronological.
#[derive(Debug, Clone)]
pub struct TradingDay {
    pub date: NaiveDate,
    pub candles: Vec<Candle>,
}

/// Split a chronological minute series into per-day session slices,
/// discarding pre/post-session bars. Days with no session bars are omitted.
pub fn trading_days(candles: &[Candle], session: &SessionHours) -> Vec<TradingDay> {
    let mut days: Vec<TradingDay> = Vec::new();

    for candle in candles {
        let time = candle.timestamp.time();
        if !session.contains(time) {
            continue;
        }
        let date = candle.timestamp.date_naive();
        if let Some(day) = days.last_mut() {
            if day.date == date {
                day.candles.push(candle.clone());
                continue;
            }
        }
        days.push(TradingDay {
            date,
            candles: vec![candle.clone()],
        });
    }

    days
}
