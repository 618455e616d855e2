//! Daily pick of the most volatile instruments by normalised ATR.

use adaptrade_core::broker::{BrokerError, Brokerage, Lookback};
use adaptrade_core::config::SelectionParameters;
use adaptrade_core::domain::{Bar, InstrumentInfo, PreparedBars};
use adaptrade_core::indicators::{latest, Atr, Indicator};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// An instrument with its volatility score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedInstrument {
    pub info: InstrumentInfo,
    /// ATR as a percentage of the last close.
    pub volatility_pct: f64,
}

/// `ATR / last close × 100`, or `None` when either is unusable.
pub fn normalized_atr_percent(bars: &[Bar], atr_period: usize) -> Option<f64> {
    let prepared = PreparedBars::prepare(bars);
    let close = prepared.last()?.close;
    let atr = latest(&Atr::new(atr_period).compute(&prepared))?;
    Some(atr / close * 100.0)
}

/// Rank tradable instruments by volatility and keep the top N.
///
/// Per-instrument fetch failures only drop that instrument; failing to list
/// instruments at all is an error.
pub fn select_top_volatile<B>(
    broker: &B,
    params: &SelectionParameters,
) -> Result<Vec<RankedInstrument>, BrokerError>
where
    B: Brokerage + Sync + ?Sized,
{
    let universe = broker.tradable_instruments()?;
    let required = params.volatility_period_days as usize;
    info!(candidates = universe.len(), "selecting volatile instruments");

    let mut ranked: Vec<RankedInstrument> = universe
        .into_par_iter()
        .filter_map(|info| {
            let bars = match broker.bars(&info.id, Lookback::daily(params.volatility_period_days)) {
                Ok(bars) => bars,
                Err(err) => {
                    warn!(instrument = %info.id, error = %err, "daily bars unavailable");
                    return None;
                }
            };
            if bars.len() < required {
                debug!(instrument = %info.id, bars = bars.len(), required, "not enough daily history");
                return None;
            }
            let volatility_pct = normalized_atr_percent(&bars, params.atr_period)?;
            Some(RankedInstrument {
                info,
                volatility_pct,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.volatility_pct
            .partial_cmp(&a.volatility_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.info.id.cmp(&b.info.id))
    });
    ranked.truncate(params.top_volatile_count);
    Ok(ranked)
}

/// Operator message listing the selection.
pub fn selection_message(ranked: &[RankedInstrument]) -> String {
    if ranked.is_empty() {
        return "Could not compute volatility for any instrument.".to_string();
    }
    let mut message = format!("Top {} volatile instruments for today:\n", ranked.len());
    for (rank, item) in ranked.iter().enumerate() {
        message.push_str(&format!(
            "{}. {} ({}) - volatility {:.2}%\n",
            rank + 1,
            item.info.ticker,
            item.info.name,
            item.volatility_pct
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn daily(ranges: &[(f64, f64)]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(close, half_range))| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + half_range,
                low: close - half_range,
                close,
                volume: Some(1.0),
            })
            .collect()
    }

    #[test]
    fn normalised_atr() {
        // Constant true range 4 on a close of 100 → 4%.
        let bars = daily(&[(100.0, 2.0); 20]);
        let pct = normalized_atr_percent(&bars, 14).unwrap();
        assert!((pct - 4.0).abs() < 1e-9);
    }

    #[test]
    fn too_short_history() {
        assert_eq!(normalized_atr_percent(&daily(&[(100.0, 2.0); 10]), 14), None);
        assert_eq!(normalized_atr_percent(&[], 14), None);
    }

    #[test]
    fn zero_close_bar_is_ignored() {
        let mut bars = daily(&[(100.0, 2.0); 20]);
        if let Some(last) = bars.last_mut() {
            last.close = 0.0;
            last.low = -2.0;
        }
        let pct = normalized_atr_percent(&bars, 14).unwrap();
        assert!((pct - 4.0).abs() < 1e-9);

        // Only 14 usable bars remain: one short of an ATR(14) value.
        bars.drain(..5);
        assert_eq!(normalized_atr_percent(&bars, 14), None);
    }

    #[test]
    fn message_lists_ranks() {
        let ranked = vec![RankedInstrument {
            info: InstrumentInfo {
                id: "SBER".into(),
                ticker: "SBER".into(),
                name: "Sberbank".into(),
            },
            volatility_pct: 3.456,
        }];
        let message = selection_message(&ranked);
        assert!(message.contains("1. SBER (Sberbank) - volatility 3.46%"), "{message}");
        assert!(selection_message(&[]).contains("Could not compute"));
    }
}
