//! Moving Average Convergence Divergence.
//!
//! MACD line = EMA(fast) - EMA(slow); signal = EMA(macd, signal_period);
//! histogram = macd - signal. Standard parameters are 12/26/9.

use crate::indicators::ema::ema_series;

/// The three MACD series, each aligned with the input length.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD over a value slice.
pub fn macd_series(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let n = values.len();
    let fast_ema = ema_series(values, fast);
    let slow_ema = ema_series(values, slow);

    let mut macd = vec![f64::NAN; n];
    for i in 0..n {
        if !fast_ema[i].is_nan() && !slow_ema[i].is_nan() {
            macd[i] = fast_ema[i] - slow_ema[i];
        }
    }

    // Signal EMA runs over the valid suffix of the MACD line
    let first_valid = macd.iter().position(|v| !v.is_nan());
    let mut signal = vec![f64::NAN; n];
    if let Some(start) = first_valid {
        let tail = ema_series(&macd[start..], signal_period);
        for (i, v) in tail.into_iter().enumerate() {
            signal[start + i] = v;
        }
    }

    let histogram = macd
        .iter()
        .zip(&signal)
        .map(|(&m, &s)| {
            if m.is_nan() || s.is_nan() {
                f64::NAN
            } else {
                m - s
            }
        })
        .collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn macd_flat_series_is_zero() {
        let values = vec![100.0; 40];
        let m = macd_series(&values, 12, 26, 9);
        // Once warm, a flat series has zero macd, signal, and histogram
        let last = values.len() - 1;
        assert_approx(m.macd[last], 0.0, DEFAULT_EPSILON);
        assert_approx(m.signal[last], 0.0, DEFAULT_EPSILON);
        assert_approx(m.histogram[last], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_warmup_is_nan() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let m = macd_series(&values, 12, 26, 9);
        // MACD needs the slow EMA: first 25 values NaN
        assert!(m.macd[24].is_nan());
        assert!(!m.macd[25].is_nan());
        // Signal needs 9 MACD values on top
        assert!(m.signal[32].is_nan());
        assert!(!m.signal[33].is_nan());
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let m = macd_series(&values, 12, 26, 9);
        let last = values.len() - 1;
        assert!(m.macd[last] > 0.0, "fast EMA should lead in an uptrend");
    }

    #[test]
    fn macd_histogram_is_difference() {
        let values: Vec<f64> = (0..50)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let m = macd_series(&values, 12, 26, 9);
        for i in 0..values.len() {
            if !m.histogram[i].is_nan() {
                assert_approx(m.histogram[i], m.macd[i] - m.signal[i], DEFAULT_EPSILON);
            }
        }
    }
}
