//! Risk engine: position sizing and stop levels under per-instrument daily trade limits.
//!
//! The engine owns the daily trade counter; everything else it needs arrives
//! per call (account data through [`AccountInfo`], bars as an optional slice).

mod ledger;
mod levels;
mod sizing;

pub use ledger::DailyTradeCounter;

use thiserror::Error;

use crate::broker::{AccountInfo, BrokerError};
use crate::config::{ConfigError, RiskParameters};
use crate::domain::{Bar, InstrumentId, PreparedBars};
use crate::indicators::{latest, Atr, Indicator};

/// Why a position size came out as zero.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SizingError {
    #[error("daily trade limit reached for {instrument} ({count}/{limit})")]
    DailyLimitReached {
        instrument: InstrumentId,
        count: u32,
        limit: u32,
    },

    #[error("account balance {0} is not positive")]
    NonPositiveBalance(f64),

    #[error("last price {0} is not a positive number")]
    InvalidPrice(f64),

    #[error("invalid risk parameters: {0}")]
    InvalidParameters(&'static str),

    #[error("lot cost is zero (lot size {lot_size}, price {price})")]
    InvalidLotCost { lot_size: u32, price: f64 },

    #[error("per-share risk {0} is not positive")]
    NonPositiveRisk(f64),

    #[error("computed size below one lot (by risk {by_risk}, by capital {by_capital})")]
    ZeroSize { by_risk: f64, by_capital: f64 },

    #[error(transparent)]
    Upstream(#[from] BrokerError),
}

#[derive(Debug, Clone)]
pub struct RiskEngine {
    params: RiskParameters,
    trades: DailyTradeCounter,
}

impl RiskEngine {
    pub fn new(params: RiskParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            params,
            trades: DailyTradeCounter::default(),
        })
    }

    pub fn params(&self) -> &RiskParameters {
        &self.params
    }

    /// Stop distance suggested by volatility: latest ATR times the multiplier.
    ///
    /// `None` when bars are absent, too short, or give a non-positive ATR.
    pub fn atr_stop_distance(&self, bars: Option<&[Bar]>) -> Option<f64> {
        let prepared = PreparedBars::prepare(bars?);
        let atr = latest(&Atr::new(self.params.atr_period).compute(&prepared))?;
        let distance = atr * self.params.atr_stop_multiplier;
        (distance > 0.0).then_some(distance)
    }

    /// Per-share stop distance: the percentage stop at `price`, widened by ATR.
    pub(crate) fn stop_distance(&self, price: f64, bars: Option<&[Bar]>) -> f64 {
        let by_percent = price * self.params.effective_stop_percent();
        match self.atr_stop_distance(bars) {
            Some(by_atr) => by_percent.max(by_atr),
            None => by_percent,
        }
    }

    pub fn trades_today(&self, instrument: &InstrumentId) -> u32 {
        self.trades.count(instrument)
    }

    /// Count an executed entry against today's limit.
    pub fn record_trade(&mut self, instrument: &InstrumentId) {
        let count = self.trades.record(instrument);
        tracing::info!(%instrument, count, "trade recorded");
    }

    pub fn reset_daily_counts(&mut self) {
        let cleared = self.trades.total();
        self.trades.reset();
        tracing::info!(cleared, "daily trade counts reset");
    }

    pub(crate) fn account_snapshot<A: AccountInfo + ?Sized>(
        &self,
        account: &A,
        instrument: &InstrumentId,
    ) -> Result<(f64, u32), SizingError> {
        let balance = account.account_balance()?;
        if !(balance > 0.0) {
            return Err(SizingError::NonPositiveBalance(balance));
        }
        let meta = account.instrument_meta(instrument)?;
        Ok((balance, meta.lot_size))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::broker::{AccountInfo, BrokerError};
    use crate::domain::{InstrumentId, InstrumentMeta};

    /// Fixed balance and lot size.
    pub struct FixedAccount {
        pub balance: f64,
        pub lot_size: u32,
    }

    impl AccountInfo for FixedAccount {
        fn account_balance(&self) -> Result<f64, BrokerError> {
            Ok(self.balance)
        }

        fn instrument_meta(&self, instrument: &InstrumentId) -> Result<InstrumentMeta, BrokerError> {
            Ok(InstrumentMeta::new(instrument.clone(), self.lot_size, 0.01))
        }
    }

    pub struct DownAccount;

    impl AccountInfo for DownAccount {
        fn account_balance(&self) -> Result<f64, BrokerError> {
            Err(BrokerError::Unavailable("connection refused".into()))
        }

        fn instrument_meta(&self, instrument: &InstrumentId) -> Result<InstrumentMeta, BrokerError> {
            Err(BrokerError::UnknownInstrument(instrument.clone()))
        }
    }
}
