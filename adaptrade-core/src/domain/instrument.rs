use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque broker-wide instrument identifier (FIGI or equivalent).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Reference data owned by the brokerage; read-only to the engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMeta {
    pub id: InstrumentId,
    /// Units per tradable lot.
    pub lot_size: u32,
    /// Price rounding granularity.
    pub min_price_increment: f64,
}

impl InstrumentMeta {
    pub fn new(id: InstrumentId, lot_size: u32, min_price_increment: f64) -> Self {
        Self {
            id,
            lot_size,
            min_price_increment,
        }
    }

    /// Round a price to the nearest multiple of the minimum increment.
    ///
    /// A non-positive or non-finite increment leaves the price untouched.
    pub fn round_to_increment(&self, price: f64) -> f64 {
        let step = self.min_price_increment;
        if !(step.is_finite() && step > 0.0) {
            return price;
        }
        (price / step).round() * step
    }

    /// Units traded for the given number of lots.
    pub fn units(&self, lots: u32) -> u64 {
        u64::from(lots) * u64::from(self.lot_size)
    }
}

/// Descriptive listing entry used when picking the trading universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub id: InstrumentId,
    pub ticker: String,
    pub name: String,
}
