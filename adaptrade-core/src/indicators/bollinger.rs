//! Bollinger Bands over close: SMA ± std_dev × population standard deviation.
//!
//! All three lines are produced in one pass. First valid value at index period-1.

use super::sma::rolling_mean;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy)]
pub struct Bollinger {
    period: usize,
    std_dev: f64,
}

/// The three band lines, aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl Bollinger {
    pub fn new(period: usize, std_dev: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        assert!(std_dev >= 0.0, "Bollinger std_dev must be >= 0");
        Self { period, std_dev }
    }
}

impl Indicator for Bollinger {
    type Output = BollingerSeries;

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> BollingerSeries {
        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        let middle = rolling_mean(&closes, self.period);
        let mut upper = vec![f64::NAN; closes.len()];
        let mut lower = vec![f64::NAN; closes.len()];

        for (end, window) in (self.period - 1..).zip(closes.windows(self.period)) {
            let mean = middle[end];
            if mean.is_nan() {
                continue;
            }
            let variance =
                window.iter().map(|c| (c - mean) * (c - mean)).sum::<f64>() / self.period as f64;
            let width = self.std_dev * variance.sqrt();
            upper[end] = mean + width;
            lower[end] = mean - width;
        }

        BollingerSeries {
            upper,
            middle,
            lower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn middle_is_sma() {
        let bands = Bollinger::new(3, 2.0).compute(&make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]));
        assert!(bands.middle[0].is_nan());
        assert!(bands.middle[1].is_nan());
        assert_approx(bands.middle[2], 11.0, DEFAULT_EPSILON);
        assert_approx(bands.middle[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_symmetric() {
        let bands = Bollinger::new(3, 2.0).compute(&make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]));
        for i in 2..5 {
            assert_approx(
                bands.upper[i] - bands.middle[i],
                bands.middle[i] - bands.lower[i],
                DEFAULT_EPSILON,
            );
        }
    }

    #[test]
    fn population_std_dev() {
        // closes 10, 11, 12: mean 11, population variance 2/3.
        let bands = Bollinger::new(3, 2.0).compute(&make_bars(&[10.0, 11.0, 12.0]));
        let expected = 11.0 + 2.0 * (2.0f64 / 3.0).sqrt();
        assert_approx(bands.upper[2], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_price_zero_width() {
        let bands = Bollinger::new(3, 2.0).compute(&make_bars(&[100.0; 4]));
        assert_approx(bands.upper[3], 100.0, DEFAULT_EPSILON);
        assert_approx(bands.lower[3], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_window() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        bars[2].close = f64::NAN;
        let bands = Bollinger::new(3, 2.0).compute(&bars);
        assert!(bands.upper[2].is_nan());
        assert!(bands.lower[3].is_nan());
    }
}
