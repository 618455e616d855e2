//! Trade decisions and the protective levels attached to them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with an instrument this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Hold,
    Buy,
    Sell,
}

impl Decision {
    pub fn is_entry(self) -> bool {
        !matches!(self, Decision::Hold)
    }

    /// Order side that opens a position for this decision.
    pub fn entry_side(self) -> Option<OrderSide> {
        match self {
            Decision::Buy => Some(OrderSide::Buy),
            Decision::Sell => Some(OrderSide::Sell),
            Decision::Hold => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Decision::Hold => "HOLD",
            Decision::Buy => "BUY",
            Decision::Sell => "SELL",
        })
    }
}

/// A decision paired with a human-readable reason.
///
/// The reason is diagnostic only. Never branch on its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub decision: Decision,
    pub reason: String,
}

impl Signal {
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
        }
    }

    pub fn hold(reason: impl Into<String>) -> Self {
        Self::new(Decision::Hold, reason)
    }

    pub fn buy(reason: impl Into<String>) -> Self {
        Self::new(Decision::Buy, reason)
    }

    pub fn sell(reason: impl Into<String>) -> Self {
        Self::new(Decision::Sell, reason)
    }
}

/// Side of an order sent to the brokerage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// Kind of protective stop order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopKind {
    StopLoss,
    TakeProfit,
}

/// Protective exit prices for an entry, both floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}
