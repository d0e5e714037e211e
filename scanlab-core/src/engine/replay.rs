//! Intraday replay: drive a scanner minute-by-minute over one trading day.
//!
//! Evaluation points only ever see history up to themselves — the window
//! passed to a scanner ends at the candidate bar, so look-ahead is
//! structurally impossible. A panic inside a scanner is caught at the
//! per-evaluation boundary, logged, and treated as a non-trigger.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::data::provider::ReferenceData;
use crate::domain::{Candle, Timeframe};
use crate::engine::forward::forward_returns;
use crate::engine::resample::resample;
use crate::engine::result::BacktestResult;
use crate::engine::warmup::WarmupState;
use crate::engine::EngineConfig;
use crate::scanners::{ScanContext, Scanner};

/// Replay one scanner over one day's session bars. Days with fewer bars
/// than the warm-up requirement are skipped entirely.
pub fn replay_day(
    scanner: &dyn Scanner,
    instrument: &str,
    bars: &[Candle],
    config: &EngineConfig,
    reference: Option<&dyn ReferenceData>,
) -> Vec<BacktestResult> {
    let mut results = Vec::new();

    if bars.len() < config.warmup_bars {
        return results;
    }

    let ctx = match reference {
        Some(r) => ScanContext::with_reference(instrument, r),
        None => ScanContext::new(instrument),
    };

    let candidates = candidate_indices(bars, config);
    let mut last_trigger: Option<usize> = None;

    for index in candidates {
        // Cooldown: no two triggers within the minimum gap
        if let Some(last) = last_trigger {
            if index - last < config.min_trigger_gap_minutes {
                continue;
            }
        }

        let window = &bars[..=index];
        let evaluation = catch_unwind(AssertUnwindSafe(|| scanner.evaluate(window, &ctx)));

        let outcome = match evaluation {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    instrument,
                    scanner = %scanner.id(),
                    timestamp = %bars[index].timestamp,
                    "scanner panicked during evaluation; treated as non-trigger"
                );
                continue;
            }
        };

        if !outcome.passed {
            continue;
        }

        last_trigger = Some(index);
        let (horizons, excursion, flags) = forward_returns(bars, index);
        results.push(BacktestResult {
            scanner_id: scanner.id(),
            instrument: instrument.to_string(),
            trigger_time: bars[index].timestamp,
            trigger_price: bars[index].close,
            horizons,
            excursion,
            flags,
        });
    }

    results
}

/// Candidate evaluation points as indices into the 1-minute bars.
///
/// M1 evaluates every bar past warm-up. M3/M5 evaluate at the close of each
/// resampled bar past the resampled warm-up, translated to the underlying
/// minute; if resampling yields no candidates, fall back to striding the
/// minute bars at the timeframe width.
fn candidate_indices(bars: &[Candle], config: &EngineConfig) -> Vec<usize> {
    match config.timeframe {
        Timeframe::M1 => warm_indices(bars.len(), config.warmup_bars),
        Timeframe::M3 | Timeframe::M5 => {
            let stride = config.timeframe.minutes() as usize;
            let resampled = resample(bars, config.timeframe.minutes());

            let mut warmup = WarmupState::new(config.resampled_warmup_bars);
            let mut candidates = Vec::new();
            for bar in &resampled {
                if warmup.is_warm() {
                    candidates.push(bar.source_index);
                }
                warmup.process_bar();
            }

            if candidates.is_empty() {
                // Degenerate session; keep scanning on a fixed stride
                (config.warmup_bars..bars.len()).step_by(stride).collect()
            } else {
                candidates
            }
        }
        Timeframe::Daily => Vec::new(),
    }
}

fn warm_indices(len: usize, warmup_bars: usize) -> Vec<usize> {
    let mut warmup = WarmupState::new(warmup_bars);
    let mut indices = Vec::new();
    for i in 0..len {
        if warmup.is_warm() {
            indices.push(i);
        }
        warmup.process_bar();
    }
    indices
}
