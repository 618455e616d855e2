//! Signal engine: a regime classifier picks the rule, and entries must pass volume confirmation.
//!
//! Rules are portfolio-agnostic: they see a prepared bar series and the last
//! traded price, nothing else. Each rule reports a degraded path as a
//! [`SignalError`]; only [`SignalEngine::get_signal`] flattens errors into HOLD.

pub mod engine;
pub mod range;
pub mod regime;
pub mod trend;
pub mod volume;

pub use engine::SignalEngine;
pub use range::BandReversion;
pub use regime::{MarketRegime, RegimeClassifier};
pub use trend::MaCrossover;
pub use volume::{VolumeCheck, VolumeConfirmation};

use crate::domain::{PreparedBars, Signal};
use thiserror::Error;

/// Why a rule could not produce a trade decision.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SignalError {
    #[error("no usable bars")]
    EmptySeries,

    #[error("insufficient data for {context}: need {needed} bars, have {available}")]
    InsufficientData {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("{0} has missing values")]
    MissingValue(&'static str),
}

/// A rule set that turns a bar series into BUY / SELL / HOLD.
pub trait SignalRule: Send + Sync {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Bars required before the rule can decide anything.
    fn warmup_bars(&self) -> usize;

    /// Evaluate on the latest bar. `Ok(HOLD)` means "looked, nothing to do";
    /// `Err` means the rule could not look.
    fn evaluate(&self, bars: &PreparedBars, last_price: f64) -> Result<Signal, SignalError>;
}

pub(crate) fn require_bars(
    context: &'static str,
    bars: &PreparedBars,
    needed: usize,
) -> Result<(), SignalError> {
    if bars.len() < needed {
        return Err(SignalError::InsufficientData {
            context,
            needed,
            available: bars.len(),
        });
    }
    Ok(())
}
