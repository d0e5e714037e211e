//! Gate primitives shared by the scanner catalog.
//!
//! Each helper computes from a chronological candle window (oldest first,
//! the bar under evaluation last) and leaves thresholding to the scanner
//! that owns the gate. Degenerate inputs return neutral values (0 ratios)
//! or `None` instead of failing.

use crate::domain::Candle;
use crate::indicators::{atr_series, ema_series, sma_series};

/// Current volume vs the mean of the trailing `period` volumes (current bar
/// included). 0.0 when the window is short or the average is zero.
pub fn trailing_volume_ratio(window: &[Candle], period: usize) -> f64 {
    if window.len() < period || period == 0 {
        return 0.0;
    }
    let current = window[window.len() - 1].volume;
    let avg = window[window.len() - period..]
        .iter()
        .map(|c| c.volume)
        .sum::<f64>()
        / period as f64;
    if avg == 0.0 {
        0.0
    } else {
        current / avg
    }
}

/// Current volume vs a daily volume-per-minute baseline. 0.0 when the
/// baseline is missing or zero.
pub fn baseline_volume_ratio(current_volume: f64, per_minute: Option<f64>) -> f64 {
    match per_minute {
        Some(baseline) if baseline > 0.0 => current_volume / baseline,
        _ => 0.0,
    }
}

/// Close position within the bar's range, in percent (0 = at low, 100 = at
/// high). `None` for a zero-range (doji) bar.
pub fn close_position_pct(candle: &Candle) -> Option<f64> {
    let range = candle.high - candle.low;
    if range > 0.0 {
        Some((candle.close - candle.low) / range * 100.0)
    } else {
        None
    }
}

/// Latest EMA13/EMA26/SMA50 and whether they are bullishly stacked.
pub fn ma_alignment(closes: &[f64]) -> Option<(f64, f64, f64, bool)> {
    let ema13 = last_valid(&ema_series(closes, 13))?;
    let ema26 = last_valid(&ema_series(closes, 26))?;
    let sma50 = last_valid(&sma_series(closes, 50))?;
    Some((ema13, ema26, sma50, ema13 > ema26 && ema26 > sma50))
}

/// Mean ATR(14) of the last 10 bars vs the 20 bars before them. The first
/// value is the recent mean, the second the older; contraction when
/// recent < older.
pub fn volatility_contraction(window: &[Candle]) -> Option<(f64, f64, bool)> {
    let atr = atr_series(window, 14);
    let n = atr.len();
    if n < 30 {
        return None;
    }
    let recent = mean_of(&atr[n - 10..])?;
    let older = mean_of(&atr[n - 30..n - 10])?;
    Some((recent, older, recent < older))
}

/// VCP volume pattern diagnostics: did volume dry up and then spike?
#[derive(Debug, Clone, Copy)]
pub struct VcpVolume {
    pub recent_volume: f64,
    pub avg_volume_20: f64,
    pub spike: bool,
    pub dried_up: bool,
}

/// Recent volume vs the trailing 20-bar average (current excluded), plus
/// whether the 20-bar average sits below the 50-bar one.
pub fn vcp_volume_pattern(window: &[Candle]) -> Option<VcpVolume> {
    let n = window.len();
    if n < 51 {
        return None;
    }
    let recent = window[n - 1].volume;
    let avg20 = window[n - 21..n - 1].iter().map(|c| c.volume).sum::<f64>() / 20.0;
    let avg50 = window[n - 51..n - 1].iter().map(|c| c.volume).sum::<f64>() / 50.0;
    Some(VcpVolume {
        recent_volume: recent,
        avg_volume_20: avg20,
        spike: recent > avg20 * 1.5,
        dried_up: avg20 < avg50,
    })
}

/// Bullish moving-average cross: the current bar opened below and closed
/// above EMA20 or SMA50. Returns (ema20, sma50, crossed).
pub fn bullish_ma_cross(window: &[Candle]) -> Option<(f64, f64, bool)> {
    let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
    let ema20 = last_valid(&ema_series(&closes, 20))?;
    let sma50 = last_valid(&sma_series(&closes, 50))?;
    let current = window.last()?;

    let crossed_ema = current.open < ema20 && current.close > ema20;
    let crossed_sma = current.open < sma50 && current.close > sma50;
    Some((ema20, sma50, crossed_ema || crossed_sma))
}

/// Deviation of the close from EMA20, in percent of the EMA.
pub fn fair_value_deviation_pct(window: &[Candle]) -> Option<f64> {
    let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
    let ema20 = last_valid(&ema_series(&closes, 20))?;
    if ema20 == 0.0 {
        return None;
    }
    let close = window.last()?.close;
    Some((close - ema20).abs() / ema20 * 100.0)
}

/// Current candle body vs the mean body of the `lookback` bars before it.
/// Ratio is 0 when the trailing average is zero.
pub fn body_height_ratio(window: &[Candle], lookback: usize) -> Option<(f64, f64, f64)> {
    let n = window.len();
    if n < lookback + 1 || lookback == 0 {
        return None;
    }
    let current = window[n - 1].body();
    let avg = window[n - 1 - lookback..n - 1]
        .iter()
        .map(|c| c.body())
        .sum::<f64>()
        / lookback as f64;
    let ratio = if avg > 0.0 { current / avg } else { 0.0 };
    Some((current, avg, ratio))
}

/// Highest high of the first `count` bars of the window, excluding the
/// current bar — the session's opening range. Returns (high, low).
pub fn opening_range(window: &[Candle], count: usize) -> Option<(f64, f64)> {
    if window.len() < 2 {
        return None;
    }
    let take = count.min(window.len() - 1);
    let head = &window[..take];
    let high = head.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = head.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    Some((high, low))
}

/// Last non-NaN value of a series.
pub fn last_valid(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| !v.is_nan())
}

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn trailing_ratio_flat_volume_is_one() {
        let candles = make_candles(&vec![100.0; 25]);
        let ratio = trailing_volume_ratio(&candles, 20);
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn trailing_ratio_short_window_is_zero() {
        let candles = make_candles(&[100.0; 5]);
        assert_eq!(trailing_volume_ratio(&candles, 20), 0.0);
    }

    #[test]
    fn trailing_ratio_detects_spike() {
        let mut candles = make_candles(&vec![100.0; 25]);
        candles.last_mut().unwrap().volume = 5000.0;
        // avg = (19*1000 + 5000)/20 = 1200; ratio = 5000/1200
        let ratio = trailing_volume_ratio(&candles, 20);
        assert!((ratio - 5000.0 / 1200.0).abs() < 1e-9);
    }

    #[test]
    fn baseline_ratio_handles_missing() {
        assert_eq!(baseline_volume_ratio(3000.0, None), 0.0);
        assert_eq!(baseline_volume_ratio(3000.0, Some(0.0)), 0.0);
        assert!((baseline_volume_ratio(3000.0, Some(1000.0)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn close_position_doji_is_none() {
        let mut candles = make_candles(&[100.0]);
        candles[0].high = 100.0;
        candles[0].low = 100.0;
        assert_eq!(close_position_pct(&candles[0]), None);
    }

    #[test]
    fn close_position_at_high_is_100() {
        let mut candles = make_candles(&[100.0]);
        candles[0].high = 100.0;
        candles[0].low = 90.0;
        candles[0].close = 100.0;
        assert!((close_position_pct(&candles[0]).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ma_alignment_in_uptrend() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        let (ema13, ema26, sma50, aligned) = ma_alignment(&closes).unwrap();
        assert!(aligned);
        assert!(ema13 > ema26);
        assert!(ema26 > sma50);
    }

    #[test]
    fn ma_alignment_short_series_is_none() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert!(ma_alignment(&closes).is_none());
    }

    #[test]
    fn volatility_contraction_detects_narrowing() {
        // Wide bars early, narrow bars late
        let mut candles = make_candles(&vec![100.0; 60]);
        for (i, c) in candles.iter_mut().enumerate() {
            let half_range = if i < 45 { 5.0 } else { 0.5 };
            c.high = c.close + half_range;
            c.low = c.close - half_range;
        }
        let (recent, older, contracting) = volatility_contraction(&candles).unwrap();
        assert!(contracting, "recent {recent} vs older {older}");
    }

    #[test]
    fn vcp_volume_pattern_spike_after_dry_up() {
        let mut candles = make_candles(&vec![100.0; 60]);
        let n = candles.len();
        for (i, c) in candles.iter_mut().enumerate() {
            c.volume = if i < n - 21 {
                2000.0 // older base
            } else if i < n - 1 {
                800.0 // drying up
            } else {
                3000.0 // breakout spike
            };
        }
        let vcp = vcp_volume_pattern(&candles).unwrap();
        assert!(vcp.spike);
        assert!(vcp.dried_up);
    }

    #[test]
    fn body_height_ratio_flags_wide_candle() {
        let mut candles = make_candles(&vec![100.0; 15]);
        // Give priors a small body, current a big one
        for c in candles.iter_mut() {
            c.open = c.close - 0.1;
        }
        let n = candles.len();
        candles[n - 1].open = candles[n - 1].close - 1.0;
        let (current, avg, ratio) = body_height_ratio(&candles, 10).unwrap();
        assert!((current - 1.0).abs() < 1e-9);
        assert!((avg - 0.1).abs() < 1e-9);
        assert!((ratio - 10.0).abs() < 1e-9);
    }

    #[test]
    fn opening_range_uses_leading_bars() {
        let mut candles = make_candles(&vec![100.0; 30]);
        candles[3].high = 110.0;
        candles[5].low = 90.0;
        let (high, low) = opening_range(&candles, 15).unwrap();
        assert!((high - 110.0).abs() < 1e-9);
        assert!((low - 90.0).abs() < 1e-9);
    }
}
