//! Daily-mode replay: evaluate at each day's close over a candle history.
//!
//! Horizons are fixed index offsets in trading days rather than timestamp
//! searches, and success means a positive next-day return. The series is
//! expected to include indicator lookback before the requested range;
//! triggers are only recorded inside the range.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::NaiveDate;
use tracing::warn;

use crate::data::provider::ReferenceData;
use crate::domain::Candle;
use crate::engine::forward::{excursion_over, flags_with_success_label, pct_change};
use crate::engine::result::{BacktestResult, HorizonReturn};
use crate::scanners::{ScanContext, Scanner};

/// Trading-day horizons: label and index offset.
pub const DAILY_HORIZONS: [(&str, usize); 4] =
    [("1day", 1), ("3day", 3), ("5day", 5), ("10day", 10)];

/// Days of warm-up before the first evaluation.
pub const DAILY_WARMUP: usize = 50;

/// Minimum series length for a daily replay.
pub const DAILY_MIN_CANDLES: usize = 60;

/// Excursion window after a daily trigger, in trading days.
const DAILY_EXCURSION_DAYS: usize = 10;

/// Replay one scanner over a daily candle series, recording triggers whose
/// date falls inside `[start, end]`.
pub fn replay_daily(
    scanner: &dyn Scanner,
    instrument: &str,
    candles: &[Candle],
    start: NaiveDate,
    end: NaiveDate,
    reference: Option<&dyn ReferenceData>,
) -> Vec<BacktestResult> {
    let mut results = Vec::new();

    if candles.len() < DAILY_MIN_CANDLES {
        return results;
    }

    let ctx = match reference {
        Some(r) => ScanContext::with_reference(instrument, r),
        None => ScanContext::new(instrument),
    };

    for index in DAILY_WARMUP..candles.len() {
        let date = candles[index].timestamp.date_naive();
        if date < start || date > end {
            continue;
        }

        let window = &candles[..=index];
        let evaluation = catch_unwind(AssertUnwindSafe(|| scanner.evaluate(window, &ctx)));

        let outcome = match evaluation {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    instrument,
                    scanner = %scanner.id(),
                    date = %date,
                    "scanner panicked during daily evaluation; treated as non-trigger"
                );
                continue;
            }
        };

        if !outcome.passed {
            continue;
        }

        let (horizons, excursion, flags) = daily_forward_returns(candles, index);
        results.push(BacktestResult {
            scanner_id: scanner.id(),
            instrument: instrument.to_string(),
            trigger_time: candles[index].timestamp,
            trigger_price: candles[index].close,
            horizons,
            excursion,
            flags,
        });
    }

    results
}

fn daily_forward_returns(
    candles: &[Candle],
    trigger_idx: usize,
) -> (
    Vec<HorizonReturn>,
    Option<crate::engine::result::Excursion>,
    crate::engine::result::SuccessFlags,
) {
    let trigger = &candles[trigger_idx];

    let horizons: Vec<HorizonReturn> = DAILY_HORIZONS
        .iter()
        .map(|&(label, offset)| {
            let future = candles.get(trigger_idx + offset);
            HorizonReturn {
                label: label.to_string(),
                price: future.map(|c| c.close),
                return_pct: future.map(|c| pct_change(trigger.close, c.close)),
            }
        })
        .collect();

    let window_end = (trigger_idx + 1 + DAILY_EXCURSION_DAYS).min(candles.len());
    let excursion = excursion_over(trigger, &candles[trigger_idx + 1..window_end]);
    let flags = flags_with_success_label(&horizons, excursion.as_ref(), "1day");

    (horizons, excursion, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScannerId;
    use crate::scanners::{ScanMetrics, ScanOutcome};
    use chrono::TimeZone;

    fn daily_candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 15, 30, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 100_000.0,
            })
            .collect()
    }

    struct AlwaysPass;

    impl Scanner for AlwaysPass {
        fn id(&self) -> ScannerId {
            ScannerId(900)
        }

        fn name(&self) -> &str {
            "always pass"
        }

        fn min_bars(&self) -> usize {
            1
        }

        fn evaluate(&self, _window: &[Candle], _ctx: &ScanContext<'_>) -> ScanOutcome {
            ScanOutcome::pass(ScanMetrics::new())
        }
    }

    fn full_range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
    }

    #[test]
    fn short_series_is_skipped() {
        let candles = daily_candles(&vec![100.0; 40]);
        let (start, end) = full_range();
        let results = replay_daily(&AlwaysPass, "TEST", &candles, start, end, None);
        assert!(results.is_empty());
    }

    #[test]
    fn horizons_use_index_offsets() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        let candles = daily_candles(&closes);
        let (start, end) = full_range();
        let results = replay_daily(&AlwaysPass, "TEST", &candles, start, end, None);

        let first = &results[0];
        // Trigger at index 50 (close 150): 1day → 151, 10day → 160
        assert_eq!(first.trigger_price, 150.0);
        assert_eq!(
            first.horizons.iter().find(|h| h.label == "1day").unwrap().price,
            Some(151.0)
        );
        assert_eq!(
            first
                .horizons
                .iter()
                .find(|h| h.label == "10day")
                .unwrap()
                .price,
            Some(160.0)
        );
        assert!(first.flags.was_successful);
    }

    #[test]
    fn trailing_triggers_have_none_horizons() {
        let candles = daily_candles(&vec![100.0; 70]);
        let (start, end) = full_range();
        let results = replay_daily(&AlwaysPass, "TEST", &candles, start, end, None);

        let last = results.last().unwrap();
        // The final day has no next-day data
        assert_eq!(
            last.horizons.iter().find(|h| h.label == "1day").unwrap().price,
            None
        );
        assert!(last.excursion.is_none());
        assert!(!last.flags.was_successful);
    }

    #[test]
    fn date_range_filters_triggers() {
        let candles = daily_candles(&vec![100.0; 80]);
        // Range covering only a few days near the end
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let results = replay_daily(&AlwaysPass, "TEST", &candles, start, end, None);

        assert!(!results.is_empty());
        for result in &results {
            let date = result.trigger_time.date_naive();
            assert!(date >= start && date <= end);
        }
    }
}
