//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Regime monotonicity: raising ADX (or lowering the threshold) never leaves the trend regime
//! 2. Sizing monotonicity: more balance never sizes smaller, a wider stop never sizes larger
//! 3. Stop level ordering: stops and targets sit on the correct side of entry, never negative
//! 4. Signal totality: arbitrary (even broken) bar series yield a decision, never a panic
//! 5. No look-ahead: indicator values on a prefix match the full-series values

use adaptrade_core::broker::{AccountInfo, BrokerError};
use adaptrade_core::config::{RiskParameters, StrategyParameters};
use adaptrade_core::domain::{Bar, Decision, InstrumentId, InstrumentMeta, PreparedBars};
use adaptrade_core::indicators::{Adx, Atr, Bollinger, Indicator, Rsi, Sma};
use adaptrade_core::risk::RiskEngine;
use adaptrade_core::strategy::{MarketRegime, RegimeClassifier, SignalEngine};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

struct Account {
    balance: f64,
    lot_size: u32,
}

impl AccountInfo for Account {
    fn account_balance(&self) -> Result<f64, BrokerError> {
        Ok(self.balance)
    }

    fn instrument_meta(&self, instrument: &InstrumentId) -> Result<InstrumentMeta, BrokerError> {
        Ok(InstrumentMeta::new(instrument.clone(), self.lot_size, 0.01))
    }
}

fn bars_from(closes: &[f64]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 7, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + Duration::minutes(5 * i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: Some(1000.0 + i as f64),
            }
        })
        .collect()
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (0.01..10_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0 + 0.01)
}

fn arb_closes(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(50.0..150.0_f64, len)
}

fn arb_maybe_broken_close() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => 50.0..150.0_f64,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
    ]
}

// ── 1. Regime monotonicity ───────────────────────────────────────────

proptest! {
    #[test]
    fn regime_is_monotone_in_adx(
        a in 0.0..100.0_f64,
        b in 0.0..100.0_f64,
        threshold in 1.0..99.0_f64,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        if MarketRegime::from_adx(low, threshold) == MarketRegime::Trend {
            prop_assert_eq!(MarketRegime::from_adx(high, threshold), MarketRegime::Trend);
        }
        prop_assert_ne!(MarketRegime::from_adx(low, threshold), MarketRegime::Unknown);
    }

    /// On a real series only the threshold moves: a higher threshold never
    /// turns RANGE into TREND, and a warmed-up series is never UNKNOWN.
    #[test]
    fn classifier_is_monotone_in_threshold(
        closes in arb_closes(30..80),
        a in 0.0..100.0_f64,
        b in 0.0..100.0_f64,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let bars = PreparedBars::prepare(&bars_from(&closes));
        let strict = RegimeClassifier::new(5, high).classify(&bars);
        let loose = RegimeClassifier::new(5, low).classify(&bars);

        prop_assert_ne!(loose, MarketRegime::Unknown);
        prop_assert_ne!(strict, MarketRegime::Unknown);
        if strict == MarketRegime::Trend {
            prop_assert_eq!(loose, MarketRegime::Trend);
        }
        let adx = RegimeClassifier::new(5, low).latest_adx(&bars).unwrap();
        prop_assert!((0.0..=100.0).contains(&adx), "adx {adx}");
    }
}

// ── 2. Sizing monotonicity ───────────────────────────────────────────

proptest! {
    #[test]
    fn size_is_monotone_in_balance(
        b1 in 0.0..1_000_000.0_f64,
        b2 in 0.0..1_000_000.0_f64,
        price in arb_price(),
        lot_size in 1u32..100,
    ) {
        let (low, high) = if b1 <= b2 { (b1, b2) } else { (b2, b1) };
        let engine = RiskEngine::new(RiskParameters::default()).unwrap();
        let id = InstrumentId::new("X");
        let small = engine.calculate_position_size(&Account { balance: low, lot_size }, &id, price, None);
        let large = engine.calculate_position_size(&Account { balance: high, lot_size }, &id, price, None);
        prop_assert!(small <= large, "balance {low} -> {small}, {high} -> {large}");
    }

    #[test]
    fn size_is_antitone_in_stop_width(
        s1 in 0.001..0.2_f64,
        s2 in 0.001..0.2_f64,
        balance in 1_000.0..1_000_000.0_f64,
        price in arb_price(),
    ) {
        let (narrow, wide) = if s1 <= s2 { (s1, s2) } else { (s2, s1) };
        let engine_with = |stop: f64| {
            RiskEngine::new(RiskParameters {
                stop_loss_percent: stop,
                ..RiskParameters::default()
            })
            .unwrap()
        };
        let account = Account { balance, lot_size: 1 };
        let id = InstrumentId::new("X");
        let narrow_size = engine_with(narrow).calculate_position_size(&account, &id, price, None);
        let wide_size = engine_with(wide).calculate_position_size(&account, &id, price, None);
        prop_assert!(wide_size <= narrow_size);
    }
}

// ── 3. Stop level ordering ───────────────────────────────────────────

proptest! {
    #[test]
    fn stop_levels_bracket_entry(
        entry in arb_price(),
        closes in arb_closes(0..40),
    ) {
        let engine = RiskEngine::new(RiskParameters::default()).unwrap();
        let bars = bars_from(&closes);

        let buy = engine.calculate_sl_tp(entry, Decision::Buy, Some(&bars)).unwrap();
        prop_assert!(buy.stop_loss >= 0.0);
        prop_assert!(buy.stop_loss < entry);
        prop_assert!(buy.take_profit > entry);

        let sell = engine.calculate_sl_tp(entry, Decision::Sell, Some(&bars)).unwrap();
        prop_assert!(sell.take_profit >= 0.0);
        prop_assert!(sell.stop_loss > entry);
        prop_assert!(sell.take_profit < entry);
    }
}

// ── 4. Signal totality ───────────────────────────────────────────────

proptest! {
    #[test]
    fn get_signal_never_panics(
        closes in prop::collection::vec(arb_maybe_broken_close(), 0..120),
        last_price in prop_oneof![arb_price(), Just(f64::NAN)],
    ) {
        let engine = SignalEngine::new(&StrategyParameters::default()).unwrap();
        let signal = engine.get_signal(&bars_from(&closes), last_price);
        prop_assert!(!signal.reason.is_empty());
    }

    #[test]
    fn short_series_always_holds(closes in arb_closes(0..60)) {
        let engine = SignalEngine::new(&StrategyParameters::default()).unwrap();
        let last = closes.last().copied().unwrap_or(100.0);
        prop_assert_eq!(engine.get_signal(&bars_from(&closes), last).decision, Decision::Hold);
    }
}

// ── 5. No look-ahead ─────────────────────────────────────────────────

fn same(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-9
}

proptest! {
    #[test]
    fn indicators_do_not_look_ahead(
        closes in arb_closes(30..80),
        cut in 1usize..30,
    ) {
        let full = bars_from(&closes);
        let prefix = &full[..full.len() - cut];

        let pairs: Vec<(Vec<f64>, Vec<f64>)> = vec![
            (Sma::new(5).compute(&full), Sma::new(5).compute(prefix)),
            (Rsi::new(14).compute(&full), Rsi::new(14).compute(prefix)),
            (Atr::new(14).compute(&full), Atr::new(14).compute(prefix)),
            (Adx::new(5).compute(&full).adx, Adx::new(5).compute(prefix).adx),
            (
                Bollinger::new(20, 2.0).compute(&full).lower,
                Bollinger::new(20, 2.0).compute(prefix).lower,
            ),
        ];
        for (whole, part) in pairs {
            for (i, (&x, &y)) in whole.iter().zip(part.iter()).enumerate() {
                prop_assert!(same(x, y), "index {i}: full {x} vs prefix {y}");
            }
        }
    }
}
