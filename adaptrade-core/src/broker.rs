//! Brokerage collaborator interface.
//!
//! The engines never talk to a broker on their own initiative; the scheduling
//! loop fetches data through [`Brokerage`] and hands it over. Position sizing
//! is the one exception: it reads balance and lot size through the narrower
//! [`AccountInfo`] seam. Retry and timeout policy belong to implementations.

use crate::domain::{Bar, InstrumentId, InstrumentInfo, InstrumentMeta, OrderSide, StopKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BrokerError {
    #[error("brokerage unavailable: {0}")]
    Unavailable(String),

    #[error("unknown instrument: {0}")]
    UnknownInstrument(InstrumentId),

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("bad market data: {0}")]
    Data(String),
}

/// Candle width requested from the brokerage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleInterval {
    FiveMinutes,
    Day,
}

/// How much history to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookback {
    pub days: u32,
    pub interval: CandleInterval,
}

impl Lookback {
    pub fn intraday(days: u32) -> Self {
        Self {
            days,
            interval: CandleInterval::FiveMinutes,
        }
    }

    pub fn daily(days: u32) -> Self {
        Self {
            days,
            interval: CandleInterval::Day,
        }
    }
}

/// Broker acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
}

/// Account and reference data needed for sizing.
pub trait AccountInfo {
    fn account_balance(&self) -> Result<f64, BrokerError>;

    fn instrument_meta(&self, instrument: &InstrumentId) -> Result<InstrumentMeta, BrokerError>;
}

/// Full brokerage surface used by the scheduling loop.
pub trait Brokerage: AccountInfo {
    /// Bars covering the lookback, in whatever order the source delivers them.
    fn bars(&self, instrument: &InstrumentId, lookback: Lookback) -> Result<Vec<Bar>, BrokerError>;

    fn last_price(&self, instrument: &InstrumentId) -> Result<f64, BrokerError>;

    /// Instruments currently open for both buying and selling.
    fn tradable_instruments(&self) -> Result<Vec<InstrumentInfo>, BrokerError>;

    fn submit_market_order(
        &mut self,
        instrument: &InstrumentId,
        lots: u32,
        side: OrderSide,
    ) -> Result<OrderReceipt, BrokerError>;

    /// `quantity` is in units, not lots.
    fn submit_stop_order(
        &mut self,
        instrument: &InstrumentId,
        quantity: u64,
        price: f64,
        side: OrderSide,
        kind: StopKind,
    ) -> Result<OrderReceipt, BrokerError>;
}
