//! Relative Strength Index with Wilder-smoothed average gain and loss.
//!
//! First valid value at index `period`. No movement → 50, only gains → 100,
//! only losses → 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self { period }
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    match (avg_gain == 0.0, avg_loss == 0.0) {
        (true, true) => 50.0,
        (_, true) => 100.0,
        (true, _) => 0.0,
        _ => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
    }
}

impl Indicator for Rsi {
    type Output = Vec<f64>;

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut out = vec![f64::NAN; n];
        if n <= self.period {
            return out;
        }

        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();
        let (seed, rest) = changes.split_at(self.period);
        if seed.iter().any(|c| !c.is_finite()) {
            return out;
        }

        let period = self.period as f64;
        let mut avg_gain = seed.iter().map(|c| c.max(0.0)).sum::<f64>() / period;
        let mut avg_loss = seed.iter().map(|c| (-c).max(0.0)).sum::<f64>() / period;
        out[self.period] = rsi_from_averages(avg_gain, avg_loss);

        for (offset, &change) in rest.iter().enumerate() {
            if !change.is_finite() {
                break;
            }
            avg_gain += (change.max(0.0) - avg_gain) / period;
            avg_loss += ((-change).max(0.0) - avg_loss) / period;
            out[self.period + 1 + offset] = rsi_from_averages(avg_gain, avg_loss);
        }
        out
    }
}
