//! Position sizing: the smaller of a risk budget and a capital cap, in whole lots.

use tracing::{debug, warn};

use super::{RiskEngine, SizingError};
use crate::broker::AccountInfo;
use crate::domain::{Bar, InstrumentId};

impl RiskEngine {
    /// Lots to trade, or the reason it is zero.
    ///
    /// - `by_risk`: `balance × risk_per_trade / (stop distance × lot size)`
    /// - `by_capital`: `balance × max_position_share / (price × lot size)`
    ///
    /// Both are floored; the result is the smaller one and at least one lot.
    pub fn try_position_size<A: AccountInfo + ?Sized>(
        &self,
        account: &A,
        instrument: &InstrumentId,
        last_price: f64,
        bars: Option<&[Bar]>,
    ) -> Result<u32, SizingError> {
        let params = self.params();
        let count = self.trades_today(instrument);
        if count >= params.max_trades_per_instrument_per_day {
            return Err(SizingError::DailyLimitReached {
                instrument: instrument.clone(),
                count,
                limit: params.max_trades_per_instrument_per_day,
            });
        }
        if !(last_price.is_finite() && last_price > 0.0) {
            return Err(SizingError::InvalidPrice(last_price));
        }

        let (balance, lot_size) = self.account_snapshot(account, instrument)?;
        let risk_amount = balance * params.risk_per_trade;
        if !(risk_amount > 0.0) {
            return Err(SizingError::InvalidParameters("risk amount is not positive"));
        }

        let lot_cost = last_price * f64::from(lot_size);
        if !(lot_cost > 0.0) {
            return Err(SizingError::InvalidLotCost {
                lot_size,
                price: last_price,
            });
        }

        let per_share = self.stop_distance(last_price, bars);
        if !(per_share > 0.0) {
            return Err(SizingError::NonPositiveRisk(per_share));
        }

        let by_risk = (risk_amount / (per_share * f64::from(lot_size))).floor();
        let max_value = balance * params.max_position_share_per_instrument;
        if !(max_value > 0.0) {
            return Err(SizingError::InvalidParameters("position cap is not positive"));
        }
        let by_capital = (max_value / lot_cost).floor();

        let lots = by_risk.min(by_capital);
        if !(lots >= 1.0) {
            return Err(SizingError::ZeroSize {
                by_risk,
                by_capital,
            });
        }
        debug!(%instrument, balance, per_share, by_risk, by_capital, "position sized");
        // Saturating float-to-int conversion.
        Ok(lots as u32)
    }

    /// Lots to trade; zero on any degraded path.
    pub fn calculate_position_size<A: AccountInfo + ?Sized>(
        &self,
        account: &A,
        instrument: &InstrumentId,
        last_price: f64,
        bars: Option<&[Bar]>,
    ) -> u32 {
        match self.try_position_size(account, instrument, last_price, bars) {
            Ok(lots) => lots,
            Err(err @ SizingError::Upstream(_)) => {
                warn!(%instrument, error = %err, "position size unavailable");
                0
            }
            Err(err) => {
                debug!(%instrument, error = %err, "position size is zero");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::BrokerError;
    use crate::config::RiskParameters;
    use crate::risk::test_support::{DownAccount, FixedAccount};

    fn engine() -> RiskEngine {
        RiskEngine::new(RiskParameters::default()).unwrap()
    }

    fn id() -> InstrumentId {
        InstrumentId::new("SBER")
    }

    #[test]
    fn capital_cap_binds() {
        // by_risk = 1000 / 0.5 = 2000; by_capital = 20000 / 100 = 200
        let account = FixedAccount {
            balance: 100_000.0,
            lot_size: 1,
        };
        assert_eq!(engine().try_position_size(&account, &id(), 100.0, None), Ok(200));
    }

    #[test]
    fn lot_size_divides() {
        let account = FixedAccount {
            balance: 100_000.0,
            lot_size: 10,
        };
        assert_eq!(engine().calculate_position_size(&account, &id(), 100.0, None), 20);
    }

    #[test]
    fn risk_budget_binds_with_wide_stop() {
        let params = RiskParameters {
            stop_loss_percent: 0.1,
            ..RiskParameters::default()
        };
        let engine = RiskEngine::new(params).unwrap();
        let account = FixedAccount {
            balance: 100_000.0,
            lot_size: 1,
        };
        // by_risk = 1000 / 10 = 100 < by_capital 200
        assert_eq!(engine.try_position_size(&account, &id(), 100.0, None), Ok(100));
    }

    #[test]
    fn daily_limit() {
        let mut engine = engine();
        let account = FixedAccount {
            balance: 100_000.0,
            lot_size: 1,
        };
        for _ in 0..5 {
            engine.record_trade(&id());
        }
        assert!(matches!(
            engine.try_position_size(&account, &id(), 100.0, None),
            Err(SizingError::DailyLimitReached { count: 5, limit: 5, .. })
        ));
        engine.reset_daily_counts();
        assert_eq!(engine.calculate_position_size(&account, &id(), 100.0, None), 200);
    }

    #[test]
    fn zero_and_negative_balance() {
        for balance in [0.0, -10.0] {
            let account = FixedAccount {
                balance,
                lot_size: 1,
            };
            assert_eq!(
                engine().try_position_size(&account, &id(), 100.0, None),
                Err(SizingError::NonPositiveBalance(balance))
            );
        }
    }

    #[test]
    fn zero_lot_size() {
        let account = FixedAccount {
            balance: 100_000.0,
            lot_size: 0,
        };
        assert!(matches!(
            engine().try_position_size(&account, &id(), 100.0, None),
            Err(SizingError::InvalidLotCost { lot_size: 0, .. })
        ));
    }

    #[test]
    fn too_expensive_is_zero() {
        let account = FixedAccount {
            balance: 1_000.0,
            lot_size: 100,
        };
        assert!(matches!(
            engine().try_position_size(&account, &id(), 100.0, None),
            Err(SizingError::ZeroSize { .. })
        ));
        assert_eq!(engine().calculate_position_size(&account, &id(), 100.0, None), 0);
    }

    #[test]
    fn bad_price() {
        let account = FixedAccount {
            balance: 100_000.0,
            lot_size: 1,
        };
        assert!(engine().try_position_size(&account, &id(), 0.0, None).is_err());
        assert!(engine().try_position_size(&account, &id(), f64::NAN, None).is_err());
    }

    #[test]
    fn broker_failure_is_zero() {
        assert_eq!(
            engine().try_position_size(&DownAccount, &id(), 100.0, None),
            Err(SizingError::Upstream(BrokerError::Unavailable(
                "connection refused".into()
            )))
        );
        assert_eq!(engine().calculate_position_size(&DownAccount, &id(), 100.0, None), 0);
    }
}
