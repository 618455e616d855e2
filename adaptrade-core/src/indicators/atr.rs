//! Average True Range (Wilder).
//!
//! TR[t] = max(high-low, |high-prev_close|, |low-prev_close|); the first bar has
//! no previous close and is left NaN so the seed starts at bar 1.
//! First valid ATR at index `period`.

use super::{wilder_smooth, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy)]
pub struct Atr {
    period: usize,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self { period }
    }
}

/// True range series; index 0 is NaN.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = vec![f64::NAN; bars.len()];
    for (i, pair) in bars.windows(2).enumerate() {
        let (prev, bar) = (&pair[0], &pair[1]);
        // f64::max drops NaN operands, so missing inputs must be caught up front.
        if bar.is_void() || !prev.close.is_finite() {
            continue;
        }
        tr[i + 1] = (bar.high - bar.low)
            .max((bar.high - prev.close).abs())
            .max((bar.low - prev.close).abs());
    }
    tr
}

impl Indicator for Atr {
    type Output = Vec<f64>;

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        wilder_smooth(&true_range(bars), self.period)
    }
}
