//! Stop-loss and take-profit placement around an entry.

use tracing::debug;

use super::RiskEngine;
use crate::domain::{Bar, Decision, StopLevels};

impl RiskEngine {
    /// Protective levels for an entry in the direction of `decision`.
    ///
    /// The stop sits one stop distance away on the losing side, the target
    /// `take_profit_ratio` distances away on the winning side. Both are
    /// floored at zero. HOLD (or a non-finite entry) has no levels.
    pub fn calculate_sl_tp(
        &self,
        entry_price: f64,
        decision: Decision,
        bars: Option<&[Bar]>,
    ) -> Option<StopLevels> {
        if !decision.is_entry() || !entry_price.is_finite() {
            return None;
        }
        let distance = self.stop_distance(entry_price, bars);
        let target = distance * self.params().take_profit_ratio;

        let (stop_loss, take_profit) = match decision {
            Decision::Buy => (entry_price - distance, entry_price + target),
            Decision::Sell => (entry_price + distance, entry_price - target),
            Decision::Hold => return None,
        };
        let levels = StopLevels {
            stop_loss: stop_loss.max(0.0),
            take_profit: take_profit.max(0.0),
        };
        debug!(entry_price, %decision, stop_loss = levels.stop_loss, take_profit = levels.take_profit, "stop levels");
        Some(levels)
    }
}
