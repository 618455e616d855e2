//! Moving average crossover, the trending-market rule.
//!
//! BUY when the fast SMA crosses above the slow SMA on the latest bar,
//! SELL on the mirror cross. Equality on the prior bar counts as "not yet
//! crossed", so a flat line never re-fires.

use super::{require_bars, SignalError, SignalRule};
use crate::domain::{PreparedBars, Signal};
use crate::indicators::{latest, previous, Indicator, Sma};

#[derive(Debug, Clone)]
pub struct MaCrossover {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl MaCrossover {
    /// # Panics
    ///
    /// Panics if `fast_period` is zero or `slow_period <= fast_period`.
    /// `SignalEngine::new` validates these first.
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        assert!(fast_period >= 1, "fast_period must be >= 1");
        assert!(slow_period > fast_period, "slow_period must be > fast_period");
        Self {
            fast_period,
            slow_period,
        }
    }
}

impl SignalRule for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    /// Two trailing slow-average points are needed to see a cross.
    fn warmup_bars(&self) -> usize {
        self.slow_period + 2
    }

    fn evaluate(&self, bars: &PreparedBars, _last_price: f64) -> Result<Signal, SignalError> {
        require_bars("MA crossover", bars, self.warmup_bars())?;

        let fast = Sma::new(self.fast_period).compute(bars);
        let slow = Sma::new(self.slow_period).compute(bars);
        let missing = || SignalError::MissingValue("moving averages");
        let fast_cur = latest(&fast).ok_or_else(missing)?;
        let slow_cur = latest(&slow).ok_or_else(missing)?;
        let fast_prev = previous(&fast).ok_or_else(missing)?;
        let slow_prev = previous(&slow).ok_or_else(missing)?;

        let label = format!("MA {}/{}", self.fast_period, self.slow_period);
        if fast_prev <= slow_prev && fast_cur > slow_cur {
            return Ok(Signal::buy(format!(
                "{label} crossed up (fast {fast_cur:.4} > slow {slow_cur:.4})"
            )));
        }
        if fast_prev >= slow_prev && fast_cur < slow_cur {
            return Ok(Signal::sell(format!(
                "{label} crossed down (fast {fast_cur:.4} < slow {slow_cur:.4})"
            )));
        }
        Ok(Signal::hold(format!("no {label} crossover")))
    }
}
