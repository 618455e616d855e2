//! Band reversion, the ranging-market rule.
//!
//! BUY when price trades below the lower Bollinger band while RSI is
//! oversold; SELL when price is above the upper band while RSI is overbought.
//! Both comparisons are strict.

use super::{require_bars, SignalError, SignalRule};
use crate::domain::{PreparedBars, Signal};
use crate::indicators::{latest, Bollinger, Indicator, Rsi};

#[derive(Debug, Clone)]
pub struct BandReversion {
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl BandReversion {
    /// # Panics
    ///
    /// Panics if either period is zero. `SignalEngine::new` validates these first.
    pub fn new(
        bb_period: usize,
        bb_std_dev: f64,
        rsi_period: usize,
        rsi_overbought: f64,
        rsi_oversold: f64,
    ) -> Self {
        assert!(bb_period >= 1, "bb_period must be >= 1");
        assert!(rsi_period >= 1, "rsi_period must be >= 1");
        Self {
            bb_period,
            bb_std_dev,
            rsi_period,
            rsi_overbought,
            rsi_oversold,
        }
    }
}

impl SignalRule for BandReversion {
    fn name(&self) -> &str {
        "band_reversion"
    }

    fn warmup_bars(&self) -> usize {
        self.bb_period + self.rsi_period
    }

    fn evaluate(&self, bars: &PreparedBars, last_price: f64) -> Result<Signal, SignalError> {
        require_bars("Bollinger/RSI", bars, self.warmup_bars())?;
        if !last_price.is_finite() {
            return Err(SignalError::MissingValue("last price"));
        }

        let bands = Bollinger::new(self.bb_period, self.bb_std_dev).compute(bars);
        let lower = latest(&bands.lower).ok_or(SignalError::MissingValue("Bollinger bands"))?;
        let upper = latest(&bands.upper).ok_or(SignalError::MissingValue("Bollinger bands"))?;
        let rsi = latest(&Rsi::new(self.rsi_period).compute(bars))
            .ok_or(SignalError::MissingValue("RSI"))?;

        if last_price < lower && rsi < self.rsi_oversold {
            return Ok(Signal::buy(format!(
                "price {last_price:.4} below lower band {lower:.4}, RSI {rsi:.1} oversold"
            )));
        }
        if last_price > upper && rsi > self.rsi_overbought {
            return Ok(Signal::sell(format!(
                "price {last_price:.4} above upper band {upper:.4}, RSI {rsi:.1} overbought"
            )));
        }
        Ok(Signal::hold(format!(
            "price {last_price:.4} inside bands [{lower:.4}, {upper:.4}] or RSI {rsi:.1} neutral"
        )))
    }
}
