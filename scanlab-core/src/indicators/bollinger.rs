//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! Middle: SMA(period); Upper/Lower: middle ± mult * stddev(period).
//! Uses population stddev (divide by N). Lookback: period - 1.

/// Upper, middle, and lower band series, aligned with the input length.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerSeries {
    /// Band width (upper - lower) at an index; NaN while warming up.
    pub fn width(&self, i: usize) -> f64 {
        match (self.upper.get(i), self.lower.get(i)) {
            (Some(&u), Some(&l)) => u - l,
            _ => f64::NAN,
        }
    }
}

/// Compute Bollinger Bands over a value slice.
pub fn bollinger_series(values: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    let n = values.len();
    let mut upper = vec![f64::NAN; n];
    let mut middle = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];

    if n >= period && period >= 1 {
        for i in (period - 1)..n {
            let window = &values[i + 1 - period..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let d = v - mean;
                    d * d
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();

            middle[i] = mean;
            upper[i] = mean + multiplier * stddev;
            lower[i] = mean - multiplier * stddev;
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, sma_series, DEFAULT_EPSILON};

    #[test]
    fn middle_band_is_sma() {
        let values = [10.0, 11.0, 12.0, 13.0, 14.0];
        let bb = bollinger_series(&values, 3, 2.0);
        let sma = sma_series(&values, 3);
        for i in 2..5 {
            assert_approx(bb.middle[i], sma[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn bands_symmetric() {
        let values = [10.0, 11.0, 12.0, 13.0, 14.0];
        let bb = bollinger_series(&values, 3, 2.0);
        for i in 2..5 {
            let half = bb.upper[i] - bb.middle[i];
            assert_approx(bb.middle[i] - bb.lower[i], half, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn constant_price_zero_width() {
        let values = [100.0, 100.0, 100.0, 100.0];
        let bb = bollinger_series(&values, 3, 2.0);
        assert_approx(bb.width(2), 0.0, DEFAULT_EPSILON);
        assert_approx(bb.upper[2], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn warmup_is_nan() {
        let bb = bollinger_series(&[10.0, 11.0, 12.0], 3, 2.0);
        assert!(bb.upper[0].is_nan());
        assert!(bb.upper[1].is_nan());
        assert!(!bb.upper[2].is_nan());
        assert!(bb.width(0).is_nan());
    }
}
