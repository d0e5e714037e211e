//! Resampling 1-minute bars into coarser intraday bars.
//!
//! Buckets are right-labelled and right-closed, anchored at midnight: a bar
//! stamped exactly on a bucket boundary closes that bucket. Each resampled
//! bar remembers the index of its last underlying 1-minute bar so triggers
//! can be translated back to the exact minute.

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::domain::Candle;

/// A resampled bar plus the index of its final source bar.
#[derive(Debug, Clone)]
pub struct ResampledBar {
    pub candle: Candle,
    pub source_index: usize,
}

/// Aggregate 1-minute bars into `minutes`-sized buckets: open = first,
/// high = max, low = min, close = last, volume = sum.
pub fn resample(bars: &[Candle], minutes: u32) -> Vec<ResampledBar> {
    assert!(minutes >= 1, "bucket size must be >= 1 minute");
    let mut result: Vec<ResampledBar> = Vec::new();
    let mut current: Option<(DateTime<Utc>, Candle, usize)> = None;

    for (index, bar) in bars.iter().enumerate() {
        let label = bucket_label(bar.timestamp, minutes);
        let same_bucket = current
            .as_ref()
            .is_some_and(|(current_label, _, _)| *current_label == label);

        if same_bucket {
            let (_, agg, last_index) = current.as_mut().expect("bucket in progress");
            agg.high = agg.high.max(bar.high);
            agg.low = agg.low.min(bar.low);
            agg.close = bar.close;
            agg.volume += bar.volume;
            *last_index = index;
        } else {
            if let Some((closed_label, mut candle, source_index)) = current.take() {
                candle.timestamp = closed_label;
                result.push(ResampledBar {
                    candle,
                    source_index,
                });
            }
            current = Some((label, bar.clone(), index));
        }
    }

    if let Some((closed_label, mut candle, source_index)) = current.take() {
        candle.timestamp = closed_label;
        result.push(ResampledBar {
            candle,
            source_index,
        });
    }

    result
}

/// Right end of the bucket containing `ts`, with boundary timestamps
/// belonging to the bucket they close.
fn bucket_label(ts: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    let minute_of_day = ts.hour() * 60 + ts.minute();
    let size = minutes;
    let end = minute_of_day.div_ceil(size) * size;
    let midnight = ts
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists")
        .and_utc();
    midnight + Duration::minutes(end as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minute_bars(start_minute: u32, closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: chrono::Utc
                    .with_ymd_and_hms(2024, 1, 2, 9, start_minute + i as u32, 0)
                    .unwrap(),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn aggregates_ohlcv() {
        // 9:16, 9:17, 9:18 share the (9:15, 9:18] bucket
        let bars = minute_bars(16, &[100.0, 102.0, 101.0]);
        let resampled = resample(&bars, 3);

        assert_eq!(resampled.len(), 1);
        let bar = &resampled[0].candle;
        assert_eq!(bar.open, 99.5); // first bar's open
        assert_eq!(bar.high, 103.0); // max high
        assert_eq!(bar.low, 99.0); // min low
        assert_eq!(bar.close, 101.0); // last close
        assert_eq!(bar.volume, 300.0);
        assert_eq!(resampled[0].source_index, 2);
        assert_eq!(
            bar.timestamp,
            chrono::Utc.with_ymd_and_hms(2024, 1, 2, 9, 18, 0).unwrap()
        );
    }

    #[test]
    fn boundary_bar_closes_its_bucket() {
        // 9:15 sits exactly on a 3-minute boundary → bucket label 9:15
        let bars = minute_bars(15, &[100.0]);
        let resampled = resample(&bars, 3);
        assert_eq!(
            resampled[0].candle.timestamp,
            chrono::Utc.with_ymd_and_hms(2024, 1, 2, 9, 15, 0).unwrap()
        );
    }

    #[test]
    fn source_index_tracks_last_minute() {
        let bars = minute_bars(16, &[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let resampled = resample(&bars, 3);
        // Buckets: (9:15,9:18] → bars 0..=2, (9:18,9:21] → bars 3..=5
        assert_eq!(resampled.len(), 2);
        assert_eq!(resampled[0].source_index, 2);
        assert_eq!(resampled[1].source_index, 5);
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(resample(&[], 3).is_empty());
    }
}
