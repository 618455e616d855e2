//! Regime-switching signal engine.
//!
//! Pipeline per evaluation:
//! 1. prepare the bars (sort, dedup, drop void rows)
//! 2. classify the regime by ADX
//! 3. run the rule set for that regime
//! 4. pass BUY/SELL through the volume filter

use tracing::{debug, warn};

use super::{
    BandReversion, MaCrossover, MarketRegime, RegimeClassifier, SignalError, SignalRule,
    VolumeCheck, VolumeConfirmation,
};
use crate::config::{ConfigError, StrategyParameters};
use crate::domain::{Bar, PreparedBars, Signal};

#[derive(Debug, Clone)]
pub struct SignalEngine {
    min_candles: usize,
    classifier: RegimeClassifier,
    trend: MaCrossover,
    range: BandReversion,
    volume: VolumeConfirmation,
}

impl SignalEngine {
    /// Build from strategy parameters. Parameters are validated first, so the
    /// indicator constructors never see a zero period.
    pub fn new(params: &StrategyParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            min_candles: params.min_candles_for_signal,
            classifier: RegimeClassifier::new(params.adx_period, params.adx_trend_threshold),
            trend: MaCrossover::new(params.ma_fast_period, params.ma_slow_period),
            range: BandReversion::new(
                params.bb_period,
                params.bb_std_dev,
                params.rsi_period,
                params.rsi_overbought,
                params.rsi_oversold,
            ),
            volume: VolumeConfirmation::new(
                params.volume_confirmation_window,
                params.volume_spike_factor,
            ),
        })
    }

    pub fn regime(&self, bars: &[Bar]) -> MarketRegime {
        self.classifier.classify(&PreparedBars::prepare(bars))
    }

    fn rule_for(&self, regime: MarketRegime) -> Option<&dyn SignalRule> {
        match regime {
            MarketRegime::Trend => Some(&self.trend),
            MarketRegime::Range => Some(&self.range),
            MarketRegime::Unknown => None,
        }
    }

    /// Full evaluation with degraded paths reported as errors.
    pub fn evaluate(&self, bars: &[Bar], last_price: f64) -> Result<Signal, SignalError> {
        let prepared = PreparedBars::prepare(bars);
        if prepared.is_empty() {
            return Err(SignalError::EmptySeries);
        }
        if prepared.len() < self.min_candles {
            return Err(SignalError::InsufficientData {
                context: "signal",
                needed: self.min_candles,
                available: prepared.len(),
            });
        }

        let regime = self.classifier.classify(&prepared);
        let Some(rule) = self.rule_for(regime) else {
            return Ok(Signal::hold("market regime unknown"));
        };

        let signal = rule.evaluate(&prepared, last_price)?;
        debug!(%regime, rule = rule.name(), decision = %signal.decision, reason = %signal.reason, "rule evaluated");
        if !signal.decision.is_entry() {
            return Ok(signal);
        }

        match self.volume.check(&prepared) {
            VolumeCheck::Confirmed => Ok(signal),
            VolumeCheck::Rejected { actual, required } => Ok(Signal::hold(format!(
                "{} signal rejected by volume filter (volume {actual:.0} < required {required:.0})",
                signal.decision
            ))),
            VolumeCheck::Missing { what } => Ok(Signal::hold(format!(
                "{} signal rejected by volume filter (no {what} volume)",
                signal.decision
            ))),
        }
    }

    /// Never fails: any degraded path becomes HOLD with the error as reason.
    pub fn get_signal(&self, bars: &[Bar], last_price: f64) -> Signal {
        match self.evaluate(bars, last_price) {
            Ok(signal) => signal,
            Err(err) => {
                warn!(error = %err, "signal evaluation degraded to HOLD");
                Signal::hold(err.to_string())
            }
        }
    }
}
