//! The scanner catalog.
//!
//! Ids follow the rule numbering used throughout the result store, so
//! historical results stay comparable across runs. Every scanner is a
//! short-circuit conjunction of gates; gate order is chosen so an early
//! failure leaves the most useful diagnostics behind.

use crate::domain::{Candle, ScannerId};
use crate::indicators::{bollinger_series, ema_series, macd_series, rsi_series};
use crate::scanners::gates;
use crate::scanners::metrics::{ScanMetrics, ScanOutcome};
use crate::scanners::{ScanContext, Scanner};

/// All catalog scanners, id order.
pub fn catalog() -> Vec<Box<dyn Scanner>> {
    vec![
        Box::new(HighVolumeBreakout),
        Box::new(VolumeMomentum),
        Box::new(VcpMaSupport),
        Box::new(FiftyTwoWeekHigh),
        Box::new(MacdRecovery),
        Box::new(BullCrossFairValue),
        Box::new(BreakingOutNow),
        Box::new(OpeningRangeBreakout),
    ]
}

/// Look up a catalog scanner by id.
pub fn by_id(id: ScannerId) -> Option<Box<dyn Scanner>> {
    catalog().into_iter().find(|s| s.id() == id)
}

fn volume_ratio_with_baseline(window: &[Candle], ctx: &ScanContext<'_>) -> f64 {
    let current = window[window.len() - 1].volume;
    match ctx.volume_per_minute(20) {
        Some(baseline) if baseline > 0.0 => gates::baseline_volume_ratio(current, Some(baseline)),
        _ => gates::trailing_volume_ratio(window, 20),
    }
}

/// Trailing average volume excluding the current bar (up to `period` bars).
fn prior_volume_ratio(window: &[Candle], period: usize) -> f64 {
    let n = window.len();
    if n < 2 {
        return 0.0;
    }
    let take = period.min(n - 1);
    let avg = window[n - 1 - take..n - 1]
        .iter()
        .map(|c| c.volume)
        .sum::<f64>()
        / take as f64;
    if avg == 0.0 {
        0.0
    } else {
        window[n - 1].volume / avg
    }
}

// ── Scanner #1 ───────────────────────────────────────────────────────

/// High-volume breakout: surge vs the daily baseline, a green candle, and a
/// close in the upper half of the bar's range.
pub struct HighVolumeBreakout;

impl Scanner for HighVolumeBreakout {
    fn id(&self) -> ScannerId {
        ScannerId(1)
    }

    fn name(&self) -> &str {
        "high volume breakout"
    }

    fn min_bars(&self) -> usize {
        20
    }

    fn evaluate(&self, window: &[Candle], ctx: &ScanContext<'_>) -> ScanOutcome {
        if window.len() < self.min_bars() {
            return ScanOutcome::fail(ScanMetrics::insufficient_data());
        }
        let mut m = ScanMetrics::new();
        let current = &window[window.len() - 1];

        let volume_ratio = volume_ratio_with_baseline(window, ctx);
        m.put_num("volume_ratio", volume_ratio);
        m.put_num("recent_volume", current.volume);
        if volume_ratio < 1.5 {
            return ScanOutcome::fail(m);
        }

        let is_green = current.is_green();
        m.put_flag("is_green", is_green);
        if !is_green {
            return ScanOutcome::fail(m);
        }

        // Doji bars pass the position gate
        let close_near_high = match gates::close_position_pct(current) {
            Some(position) => {
                m.put_num("close_position", position);
                position >= 50.0
            }
            None => {
                m.put_num("close_position", 50.0);
                true
            }
        };
        m.put_flag("close_near_high", close_near_high);
        if !close_near_high {
            return ScanOutcome::fail(m);
        }

        ScanOutcome::pass(m)
    }
}

// ── Scanner #12 ──────────────────────────────────────────────────────

/// Volume surge plus building momentum: two consecutive green candles with
/// rising closes.
pub struct VolumeMomentum;

impl Scanner for VolumeMomentum {
    fn id(&self) -> ScannerId {
        ScannerId(12)
    }

    fn name(&self) -> &str {
        "volume + strong momentum"
    }

    fn min_bars(&self) -> usize {
        20
    }

    fn evaluate(&self, window: &[Candle], ctx: &ScanContext<'_>) -> ScanOutcome {
        if window.len() < self.min_bars() {
            return ScanOutcome::fail(ScanMetrics::insufficient_data());
        }
        let mut m = ScanMetrics::new();

        let volume_ratio = volume_ratio_with_baseline(window, ctx);
        m.put_num("volume_ratio", volume_ratio);
        m.put_num("recent_volume", window[window.len() - 1].volume);
        if volume_ratio < 1.5 {
            return ScanOutcome::fail(m);
        }

        let two_green = window[window.len() - 2..].iter().all(|c| c.is_green());
        m.put_flag("two_green_candles", two_green);
        if !two_green {
            return ScanOutcome::fail(m);
        }

        let increasing = window[window.len() - 1].close > window[window.len() - 2].close;
        m.put_flag("increasing_closes", increasing);
        if !increasing {
            return ScanOutcome::fail(m);
        }

        ScanOutcome::pass(m)
    }
}

// ── Scanner #14 ──────────────────────────────────────────────────────

/// Volatility-contraction setup over MA support: stacked moving averages,
/// contracting ATR, volume dry-up followed by a spike, price above its MAs.
pub struct VcpMaSupport;

impl Scanner for VcpMaSupport {
    fn id(&self) -> ScannerId {
        ScannerId(14)
    }

    fn name(&self) -> &str {
        "vcp + ma support"
    }

    fn min_bars(&self) -> usize {
        200
    }

    fn evaluate(&self, window: &[Candle], _ctx: &ScanContext<'_>) -> ScanOutcome {
        if window.len() < self.min_bars() {
            return ScanOutcome::fail(ScanMetrics::insufficient_data());
        }
        let mut m = ScanMetrics::new();
        let closes: Vec<f64> = window.iter().map(|c| c.close).collect();

        let Some((ema13, ema26, sma50, aligned)) = gates::ma_alignment(&closes) else {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        };
        m.put_num("ema_13", ema13);
        m.put_num("ema_26", ema26);
        m.put_num("sma_50", sma50);
        m.put_flag("ma_aligned", aligned);
        if !aligned {
            return ScanOutcome::fail(m);
        }

        let Some((recent_atr, older_atr, contracting)) = gates::volatility_contraction(window)
        else {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        };
        m.put_num("recent_atr", recent_atr);
        m.put_num("older_atr", older_atr);
        m.put_flag("volatility_contracting", contracting);
        if !contracting {
            return ScanOutcome::fail(m);
        }

        let Some(vcp) = gates::vcp_volume_pattern(window) else {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        };
        m.put_num("recent_volume", vcp.recent_volume);
        m.put_num("avg_volume_20", vcp.avg_volume_20);
        m.put_flag("volume_spike", vcp.spike);
        m.put_flag("volume_dried_up", vcp.dried_up);
        if !(vcp.spike && vcp.dried_up) {
            return ScanOutcome::fail(m);
        }

        let close = closes[closes.len() - 1];
        let ema20 = gates::last_valid(&ema_series(&closes, 20)).unwrap_or(f64::MAX);
        let price_above = close > ema20 && close > sma50;
        m.put_flag("price_above_ma", price_above);
        if !price_above {
            return ScanOutcome::fail(m);
        }

        ScanOutcome::pass(m)
    }
}

// ── Scanner #17 ──────────────────────────────────────────────────────

/// 52-week-high breakout: the current high clears the trailing-session
/// reference high, confirmed by volume.
pub struct FiftyTwoWeekHigh;

impl Scanner for FiftyTwoWeekHigh {
    fn id(&self) -> ScannerId {
        ScannerId(17)
    }

    fn name(&self) -> &str {
        "52-week high breakout"
    }

    fn min_bars(&self) -> usize {
        20
    }

    fn evaluate(&self, window: &[Candle], ctx: &ScanContext<'_>) -> ScanOutcome {
        if window.len() < self.min_bars() {
            return ScanOutcome::fail(ScanMetrics::insufficient_data());
        }
        let mut m = ScanMetrics::new();
        let n = window.len();
        let current_high = window[n - 1].high;

        // Reference data gives the true 52-week high; otherwise fall back to
        // the best high available inside the window.
        let reference_high = match ctx.rolling_high(250) {
            Some(high) => high,
            None => {
                let lookback = (n - 1).min(250);
                window[n - 1 - lookback..n - 1]
                    .iter()
                    .map(|c| c.high)
                    .fold(f64::MIN, f64::max)
            }
        };
        m.put_num("high_52week", reference_high);
        m.put_num("current_high", current_high);
        let breakout = current_high >= reference_high;
        m.put_flag("breakout_52week", breakout);
        if !breakout {
            return ScanOutcome::fail(m);
        }

        let volume_ratio = prior_volume_ratio(window, 20);
        m.put_num("volume_ratio", volume_ratio);
        let confirmed = volume_ratio >= 1.5;
        m.put_flag("volume_confirmed", confirmed);
        if !confirmed {
            return ScanOutcome::fail(m);
        }

        ScanOutcome::pass(m)
    }
}

// ── Scanner #20 ──────────────────────────────────────────────────────

/// MACD histogram V-shape recovery with strengthening momentum — the
/// "bullish for tomorrow" setup.
pub struct MacdRecovery;

impl Scanner for MacdRecovery {
    fn id(&self) -> ScannerId {
        ScannerId(20)
    }

    fn name(&self) -> &str {
        "macd recovery"
    }

    fn min_bars(&self) -> usize {
        50
    }

    fn evaluate(&self, window: &[Candle], _ctx: &ScanContext<'_>) -> ScanOutcome {
        if window.len() < self.min_bars() {
            return ScanOutcome::fail(ScanMetrics::insufficient_data());
        }
        let mut m = ScanMetrics::new();
        let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
        let macd = macd_series(&closes, 12, 26, 9);
        let n = closes.len();

        let hist_0 = macd.histogram[n - 1];
        let hist_1 = macd.histogram[n - 2];
        let hist_2 = macd.histogram[n - 3];
        let macd_0 = macd.macd[n - 1];
        let macd_1 = macd.macd[n - 2];
        let signal_0 = macd.signal[n - 1];
        let signal_1 = macd.signal[n - 2];

        if [hist_0, hist_1, hist_2, macd_0, macd_1, signal_0, signal_1]
            .iter()
            .any(|v| v.is_nan())
        {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        }

        let v_shape = hist_2 < hist_1 && hist_0 > hist_1;
        m.put_flag("v_shape_recovery", v_shape);
        if !v_shape {
            return ScanOutcome::fail(m);
        }

        let diff_increase = (macd_0 - signal_0) - (macd_1 - signal_1);
        m.put_num("macd_signal_diff_increase", diff_increase);
        if diff_increase < 0.2 {
            return ScanOutcome::fail(m);
        }

        let bullish = macd_0 > signal_0;
        m.put_flag("bullish_crossover", bullish);
        if !bullish {
            return ScanOutcome::fail(m);
        }

        m.put_num("macd", macd_0);
        m.put_num("signal", signal_0);
        ScanOutcome::pass(m)
    }
}

// ── Scanner #21 ──────────────────────────────────────────────────────

/// Bullish MA cross near fair value: price crossed above EMA20 or SMA50
/// without being extended from the mean, with volume confirmation.
pub struct BullCrossFairValue;

impl Scanner for BullCrossFairValue {
    fn id(&self) -> ScannerId {
        ScannerId(21)
    }

    fn name(&self) -> &str {
        "bull cross + fair value"
    }

    fn min_bars(&self) -> usize {
        100
    }

    fn evaluate(&self, window: &[Candle], ctx: &ScanContext<'_>) -> ScanOutcome {
        if window.len() < self.min_bars() {
            return ScanOutcome::fail(ScanMetrics::insufficient_data());
        }
        let mut m = ScanMetrics::new();

        let Some((ema20, sma50, crossed)) = gates::bullish_ma_cross(window) else {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        };
        m.put_num("ema_20", ema20);
        m.put_num("sma_50", sma50);
        m.put_flag("bullish_cross", crossed);
        if !crossed {
            return ScanOutcome::fail(m);
        }

        let Some(deviation) = gates::fair_value_deviation_pct(window) else {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        };
        m.put_num("price_deviation_pct", deviation);
        let fair_value = deviation <= 2.5;
        m.put_flag("fair_value", fair_value);
        if !fair_value {
            return ScanOutcome::fail(m);
        }

        let volume_ratio = gates::trailing_volume_ratio(window, 20);
        m.put_num("volume_ratio", volume_ratio);
        if volume_ratio < 1.5 {
            return ScanOutcome::fail(m);
        }

        ScanOutcome::pass(m)
    }
}

// ── Scanner #23 ──────────────────────────────────────────────────────

/// Breaking out now: an outsized candle body with expanding Bollinger
/// bands and bullish color.
pub struct BreakingOutNow;

impl Scanner for BreakingOutNow {
    fn id(&self) -> ScannerId {
        ScannerId(23)
    }

    fn name(&self) -> &str {
        "breaking out now"
    }

    fn min_bars(&self) -> usize {
        30
    }

    fn evaluate(&self, window: &[Candle], _ctx: &ScanContext<'_>) -> ScanOutcome {
        if window.len() < self.min_bars() {
            return ScanOutcome::fail(ScanMetrics::insufficient_data());
        }
        let mut m = ScanMetrics::new();

        let Some((current_height, avg_height, ratio)) = gates::body_height_ratio(window, 10)
        else {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        };
        m.put_num("recent_candle_height", current_height);
        m.put_num("avg_candle_height", avg_height);
        m.put_num("height_ratio", ratio);
        let breakout_candle = ratio >= 3.0;
        m.put_flag("is_breakout_candle", breakout_candle);
        if !breakout_candle {
            return ScanOutcome::fail(m);
        }

        let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
        let bb = bollinger_series(&closes, 20, 2.0);
        let n = closes.len();
        let width_now = bb.width(n - 1);
        let width_prev = bb.width(n - 2);
        if width_now.is_nan() || width_prev.is_nan() {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        }
        let expanding = width_now > width_prev;
        m.put_flag("bb_expanding", expanding);
        if !expanding {
            return ScanOutcome::fail(m);
        }

        let is_green = window[n - 1].is_green();
        m.put_flag("is_green_candle", is_green);
        if !is_green {
            return ScanOutcome::fail(m);
        }

        ScanOutcome::pass(m)
    }
}

// ── Scanner #32 ──────────────────────────────────────────────────────

/// Opening-range breakout: close beyond the first fifteen minutes' extremes,
/// a volume surge, and RSI confirmation in the breakout direction.
pub struct OpeningRangeBreakout;

impl Scanner for OpeningRangeBreakout {
    fn id(&self) -> ScannerId {
        ScannerId(32)
    }

    fn name(&self) -> &str {
        "opening range breakout"
    }

    fn min_bars(&self) -> usize {
        30
    }

    fn evaluate(&self, window: &[Candle], ctx: &ScanContext<'_>) -> ScanOutcome {
        if window.len() < self.min_bars() {
            return ScanOutcome::fail(ScanMetrics::insufficient_data());
        }
        let mut m = ScanMetrics::new();
        let n = window.len();
        let current_close = window[n - 1].close;

        let Some((opening_high, opening_low)) = gates::opening_range(window, 15) else {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        };
        m.put_num("opening_high", opening_high);
        m.put_num("opening_low", opening_low);
        m.put_num("current_close", current_close);

        let bullish = current_close > opening_high;
        let bearish = current_close < opening_low;
        m.put_flag("breakout_bullish", bullish);
        m.put_flag("breakout_bearish", bearish);
        if !bullish && !bearish {
            return ScanOutcome::fail(m);
        }

        let volume_ratio = match ctx.volume_per_minute(20) {
            Some(baseline) if baseline > 0.0 => {
                gates::baseline_volume_ratio(window[n - 1].volume, Some(baseline))
            }
            _ => prior_volume_ratio(window, 20),
        };
        m.put_num("volume_ratio", volume_ratio);
        let surge = volume_ratio >= 2.0;
        m.put_flag("volume_surge", surge);
        if !surge {
            return ScanOutcome::fail(m);
        }

        let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
        let Some(rsi) = gates::last_valid(&rsi_series(&closes, 14)) else {
            m.error = Some("indicator unavailable".to_string());
            return ScanOutcome::fail(m);
        };
        m.put_num("rsi", rsi);
        let confirmed = (bullish && rsi > 55.0) || (bearish && rsi < 45.0);
        m.put_flag("rsi_confirmed", confirmed);
        if !confirmed {
            return ScanOutcome::fail(m);
        }

        ScanOutcome::pass(m)
    }
}
