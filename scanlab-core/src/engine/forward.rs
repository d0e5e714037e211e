//! Forward-return computation for triggers.
//!
//! For each fixed horizon the future bar closest in time to
//! `trigger_time + horizon` supplies the price; the excursion scan walks
//! every future session bar for the highest high and lowest low. A trigger
//! with no future bars yields `None` horizons and no excursion.

use chrono::Duration;

use crate::domain::Candle;
use crate::engine::result::{Excursion, HorizonReturn, SuccessFlags};

/// Intraday horizons: label and minute offset.
pub const INTRADAY_HORIZONS: [(&str, i64); 6] = [
    ("3min", 3),
    ("5min", 5),
    ("15min", 15),
    ("30min", 30),
    ("1hour", 60),
    ("2hours", 120),
];

/// Label of the horizon that defines `was_successful`.
pub const SUCCESS_HORIZON: &str = "3min";

/// Forward annotation for a trigger at `trigger_idx` within a session's
/// bars.
pub fn forward_returns(
    bars: &[Candle],
    trigger_idx: usize,
) -> (Vec<HorizonReturn>, Option<Excursion>, SuccessFlags) {
    let trigger = &bars[trigger_idx];
    let future = &bars[trigger_idx + 1..];

    let horizons: Vec<HorizonReturn> = INTRADAY_HORIZONS
        .iter()
        .map(|&(label, minutes)| {
            horizon_return(trigger, future, label, Duration::minutes(minutes))
        })
        .collect();

    let excursion = excursion_over(trigger, future);
    let flags = success_flags(&horizons, excursion.as_ref());

    (horizons, excursion, flags)
}

fn horizon_return(
    trigger: &Candle,
    future: &[Candle],
    label: &str,
    offset: Duration,
) -> HorizonReturn {
    let target = trigger.timestamp + offset;
    let closest = future.iter().min_by_key(|c| {
        (c.timestamp - target)
            .num_seconds()
            .unsigned_abs()
    });

    match closest {
        Some(bar) => HorizonReturn {
            label: label.to_string(),
            price: Some(bar.close),
            return_pct: Some(pct_change(trigger.close, bar.close)),
        },
        None => HorizonReturn {
            label: label.to_string(),
            price: None,
            return_pct: None,
        },
    }
}

/// Excursion fold, seeded with the trigger price so favorable stays >= 0 and
/// adverse <= 0 whenever any future bar exists.
pub fn excursion_over(trigger: &Candle, future: &[Candle]) -> Option<Excursion> {
    if future.is_empty() {
        return None;
    }

    let mut best_high = trigger.close;
    let mut best_high_time = trigger.timestamp;
    let mut worst_low = trigger.close;
    let mut worst_low_time = trigger.timestamp;

    for bar in future {
        if bar.high > best_high {
            best_high = bar.high;
            best_high_time = bar.timestamp;
        }
        if bar.low < worst_low {
            worst_low = bar.low;
            worst_low_time = bar.timestamp;
        }
    }

    Some(Excursion {
        max_favorable_pct: pct_change(trigger.close, best_high),
        max_adverse_pct: pct_change(trigger.close, worst_low),
        max_favorable_time: best_high_time,
        max_adverse_time: worst_low_time,
    })
}

/// Flags shared by the intraday and daily modes. The success horizon label
/// differs per mode; a missing horizon counts as unsuccessful.
pub fn flags_with_success_label(
    horizons: &[HorizonReturn],
    excursion: Option<&Excursion>,
    success_label: &str,
) -> SuccessFlags {
    let success_return = horizons
        .iter()
        .find(|h| h.label == success_label)
        .and_then(|h| h.return_pct);

    SuccessFlags {
        was_successful: success_return.is_some_and(|r| r > 0.0),
        hit_target_1pct: excursion.is_some_and(|e| e.max_favorable_pct >= 1.0),
        hit_target_2pct: excursion.is_some_and(|e| e.max_favorable_pct >= 2.0),
        hit_stoploss: excursion.is_some_and(|e| e.max_adverse_pct <= -1.0),
    }
}

fn success_flags(horizons: &[HorizonReturn], excursion: Option<&Excursion>) -> SuccessFlags {
    flags_with_success_label(horizons, excursion, SUCCESS_HORIZON)
}

pub(crate) fn pct_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}
