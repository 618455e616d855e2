//! Simple Moving Average of close.
//!
//! First valid value at index period-1. A window containing NaN yields NaN.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Rolling mean of an arbitrary series.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for (end, window) in (period - 1..).zip(values.windows(period)) {
        // Summing each window keeps flat inputs exactly flat.
        out[end] = window.iter().sum::<f64>() / period as f64;
    }
    out
}

impl Indicator for Sma {
    type Output = Vec<f64>;

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        rolling_mean(&closes, self.period)
    }
}
