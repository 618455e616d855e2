//! Market regime classification by ADX trend strength.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::{require_bars, SignalError};
use crate::domain::PreparedBars;
use crate::indicators::{latest, Adx, Indicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    Trend,
    Range,
    Unknown,
}

impl MarketRegime {
    /// Strictly above the threshold is a trend; NaN is unknown.
    pub fn from_adx(adx: f64, threshold: f64) -> Self {
        if adx.is_nan() {
            MarketRegime::Unknown
        } else if adx > threshold {
            MarketRegime::Trend
        } else {
            MarketRegime::Range
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarketRegime::Trend => "TREND",
            MarketRegime::Range => "RANGE",
            MarketRegime::Unknown => "UNKNOWN",
        })
    }
}

#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    adx: Adx,
    threshold: f64,
}

impl RegimeClassifier {
    pub fn new(adx_period: usize, threshold: f64) -> Self {
        Self {
            adx: Adx::new(adx_period),
            threshold,
        }
    }

    /// ADX at the most recent bar.
    pub fn latest_adx(&self, bars: &PreparedBars) -> Result<f64, SignalError> {
        require_bars("ADX", bars, self.adx.period() + 1)?;
        latest(&self.adx.compute(bars).adx).ok_or(SignalError::MissingValue("ADX"))
    }

    /// Never fails: anything that prevents reading ADX classifies as `Unknown`.
    pub fn classify(&self, bars: &PreparedBars) -> MarketRegime {
        match self.latest_adx(bars) {
            Ok(adx) => {
                let regime = MarketRegime::from_adx(adx, self.threshold);
                debug!(%regime, adx, threshold = self.threshold, "market regime");
                regime
            }
            Err(err) => {
                debug!(error = %err, "market regime unknown");
                MarketRegime::Unknown
            }
        }
    }
}
