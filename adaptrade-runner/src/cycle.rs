//! One pass over the selected instruments: signal, size, enter, protect.
//!
//! Failures are per instrument. A broken price feed or a rejected order skips
//! that instrument and lands in [`CycleReport::errors`]; the pass goes on.

use adaptrade_core::broker::{Brokerage, Lookback};
use adaptrade_core::config::RunnerParameters;
use adaptrade_core::domain::{Decision, InstrumentId, OrderSide, StopKind, StopLevels};
use adaptrade_core::risk::RiskEngine;
use adaptrade_core::strategy::SignalEngine;
use tracing::{debug, error, info, warn};

use crate::notify::Notifier;
use crate::state::BotState;

/// An entry that was sent to the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeReport {
    pub instrument: InstrumentId,
    pub ticker: String,
    pub side: OrderSide,
    pub lots: u32,
    pub quantity: u64,
    pub entry_price: f64,
    /// Levels as submitted (rounded to the price increment).
    pub levels: Option<StopLevels>,
    pub reason: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Instruments that reached signal evaluation.
    pub evaluated: usize,
    /// Instruments skipped for missing price or history.
    pub skipped: usize,
    /// BUY/SELL signals that passed the volume filter.
    pub signals: usize,
    pub trades: Vec<TradeReport>,
    pub errors: Vec<String>,
}

/// Everything one cycle reads or mutates.
pub struct Cycle<'a, B: Brokerage + ?Sized> {
    pub broker: &'a mut B,
    pub signals: &'a SignalEngine,
    pub risk: &'a mut RiskEngine,
    pub state: &'a mut BotState,
    pub notifier: &'a mut dyn Notifier,
    pub params: &'a RunnerParameters,
}

impl<'a, B: Brokerage + ?Sized> Cycle<'a, B> {
    pub fn run(mut self) -> CycleReport {
        let mut report = CycleReport::default();
        let instruments: Vec<(InstrumentId, String, String)> = self
            .state
            .instruments
            .iter()
            .map(|item| (item.info.id.clone(), item.info.ticker.clone(), item.info.name.clone()))
            .collect();

        for (id, ticker, name) in instruments {
            self.instrument(&id, &ticker, &name, &mut report);
        }
        debug!(
            evaluated = report.evaluated,
            skipped = report.skipped,
            signals = report.signals,
            trades = report.trades.len(),
            "cycle finished"
        );
        report
    }

    fn instrument(&mut self, id: &InstrumentId, ticker: &str, name: &str, report: &mut CycleReport) {
        let price = match self.broker.last_price(id) {
            Ok(price) if price.is_finite() && price > 0.0 => price,
            Ok(price) => {
                warn!(instrument = %id, price, "unusable last price");
                report.skipped += 1;
                return;
            }
            Err(err) => {
                warn!(instrument = %id, error = %err, "last price unavailable");
                report.errors.push(format!("{ticker}: {err}"));
                report.skipped += 1;
                return;
            }
        };
        self.state.last_prices.insert(id.clone(), price);

        let bars = match self.broker.bars(id, Lookback::intraday(self.params.intraday_lookback_days)) {
            Ok(bars) => bars,
            Err(err) => {
                warn!(instrument = %id, error = %err, "intraday bars unavailable");
                report.errors.push(format!("{ticker}: {err}"));
                report.skipped += 1;
                return;
            }
        };
        if bars.len() < self.params.min_cycle_bars {
            debug!(instrument = %id, bars = bars.len(), "not enough intraday history");
            report.skipped += 1;
            return;
        }

        report.evaluated += 1;
        let signal = self.signals.get_signal(&bars, price);
        let Some(side) = signal.decision.entry_side() else {
            return;
        };
        report.signals += 1;
        info!(instrument = %id, %ticker, decision = %signal.decision, reason = %signal.reason, "entry signal");

        let lots = self.risk.calculate_position_size(&*self.broker, id, price, Some(&bars));
        if lots == 0 {
            info!(instrument = %id, "no entry: position size is zero or daily limit reached");
            return;
        }
        let meta = match self.broker.instrument_meta(id) {
            Ok(meta) => meta,
            Err(err) => {
                error!(instrument = %id, error = %err, "instrument metadata unavailable");
                report.errors.push(format!("{ticker}: {err}"));
                return;
            }
        };

        let receipt = match self.broker.submit_market_order(id, lots, side) {
            Ok(receipt) => receipt,
            Err(err) => {
                error!(instrument = %id, error = %err, "market order failed");
                report.errors.push(format!("{ticker}: {err}"));
                return;
            }
        };
        self.risk.record_trade(id);
        self.state.trades_today += 1;

        let quantity = meta.units(lots);
        let levels = self
            .risk
            .calculate_sl_tp(price, signal.decision, Some(&bars))
            .map(|levels| StopLevels {
                stop_loss: meta.round_to_increment(levels.stop_loss),
                take_profit: meta.round_to_increment(levels.take_profit),
            });
        match levels {
            Some(levels) => {
                let exit = side.opposite();
                for (kind, price) in [
                    (StopKind::StopLoss, levels.stop_loss),
                    (StopKind::TakeProfit, levels.take_profit),
                ] {
                    if let Err(err) = self.broker.submit_stop_order(id, quantity, price, exit, kind) {
                        error!(instrument = %id, ?kind, price, error = %err, "stop order failed");
                        report.errors.push(format!("{ticker}: {kind:?} at {price}: {err}"));
                    }
                }
            }
            None => warn!(instrument = %id, "no stop levels for entry"),
        }

        let trade = TradeReport {
            instrument: id.clone(),
            ticker: ticker.to_string(),
            side,
            lots,
            quantity,
            entry_price: price,
            levels,
            reason: signal.reason,
            order_id: receipt.order_id,
        };
        self.notifier.send(&trade_message(&trade, name, signal.decision));
        report.trades.push(trade);
    }
}

fn trade_message(trade: &TradeReport, name: &str, decision: Decision) -> String {
    let (stop_loss, take_profit) = match trade.levels {
        Some(levels) => (
            format!("{:.4}", levels.stop_loss),
            format!("{:.4}", levels.take_profit),
        ),
        None => ("n/a".to_string(), "n/a".to_string()),
    };
    format!(
        "NEW TRADE\n\n\
         Instrument: {} ({name})\n\
         Direction: {decision}\n\
         Entry price: {:.4}\n\
         Size: {} units ({} lots)\n\
         Stop loss: {stop_loss}\n\
         Take profit: {take_profit}\n\n\
         Reason: {}",
        trade.ticker, trade.entry_price, trade.quantity, trade.lots, trade.reason
    )
}
