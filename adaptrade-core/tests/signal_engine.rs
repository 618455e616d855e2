//! Signal engine end to end: regime routing, both rule sets, volume filter,
//! and input preparation.

use adaptrade_core::config::StrategyParameters;
use adaptrade_core::domain::{Bar, Decision};
use adaptrade_core::strategy::{MarketRegime, SignalEngine, SignalError};
use chrono::{Duration, TimeZone, Utc};

fn bars(closes: &[f64], volumes: &[Option<f64>]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 7, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + Duration::minutes(5 * i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: volumes.get(i).copied().flatten(),
            }
        })
        .collect()
}

fn small_params() -> StrategyParameters {
    StrategyParameters {
        adx_period: 3,
        adx_trend_threshold: 25.0,
        min_candles_for_signal: 5,
        volume_confirmation_window: 20,
        volume_spike_factor: 1.5,
        ma_fast_period: 2,
        ma_slow_period: 4,
        bb_period: 5,
        bb_std_dev: 2.0,
        rsi_period: 3,
        rsi_overbought: 70.0,
        rsi_oversold: 30.0,
    }
}

fn jump_closes(last: f64) -> Vec<f64> {
    let mut closes = vec![10.0; 6];
    closes.push(last);
    closes
}

fn falling_closes() -> Vec<f64> {
    (0..10).map(|i| 20.0 - i as f64).collect()
}

#[test]
fn trending_market_routes_to_crossover() {
    let engine = SignalEngine::new(&small_params()).unwrap();
    let up = bars(&jump_closes(12.0), &[]);
    let down = bars(&jump_closes(8.0), &[]);
    assert_eq!(engine.regime(&up), MarketRegime::Trend);
    assert_eq!(engine.get_signal(&up, 12.0).decision, Decision::Buy);
    assert_eq!(engine.get_signal(&down, 8.0).decision, Decision::Sell);
}

#[test]
fn ranging_market_routes_to_band_reversion() {
    // ADX on a steady decline is exactly 100, never strictly above 100.
    let params = StrategyParameters {
        adx_trend_threshold: 100.0,
        ..small_params()
    };
    let engine = SignalEngine::new(&params).unwrap();
    let series = bars(&falling_closes(), &[]);
    assert_eq!(engine.regime(&series), MarketRegime::Range);

    let signal = engine.get_signal(&series, 9.0);
    assert_eq!(signal.decision, Decision::Buy, "{}", signal.reason);
    assert_eq!(engine.get_signal(&series, 13.0).decision, Decision::Hold);
}

#[test]
fn flat_market_holds() {
    let engine = SignalEngine::new(&small_params()).unwrap();
    let series = bars(&[10.0; 30], &[]);
    assert_eq!(engine.regime(&series), MarketRegime::Range);
    assert_eq!(engine.get_signal(&series, 10.0).decision, Decision::Hold);
}

#[test]
fn volume_spike_boundary() {
    let engine = SignalEngine::new(&small_params()).unwrap();
    let closes = jump_closes(12.0);

    let mut volumes = vec![Some(100.0); 6];
    volumes.push(Some(150.0));
    assert_eq!(engine.get_signal(&bars(&closes, &volumes), 12.0).decision, Decision::Buy);

    volumes[6] = Some(149.0);
    let signal = engine.get_signal(&bars(&closes, &volumes), 12.0);
    assert_eq!(signal.decision, Decision::Hold);
    assert!(signal.reason.contains("volume filter"), "{}", signal.reason);
    assert!(signal.reason.contains("149"), "{}", signal.reason);
    assert!(signal.reason.contains("150"), "{}", signal.reason);
}

#[test]
fn insufficient_candles_is_reported() {
    let engine = SignalEngine::new(&small_params()).unwrap();
    let series = bars(&[10.0; 4], &[]);
    assert_eq!(
        engine.evaluate(&series, 10.0),
        Err(SignalError::InsufficientData {
            context: "signal",
            needed: 5,
            available: 4
        })
    );
    let signal = engine.get_signal(&series, 10.0);
    assert_eq!(signal.decision, Decision::Hold);
    assert!(signal.reason.contains("insufficient data"));
}

#[test]
fn duplicates_and_void_rows_are_dropped() {
    let engine = SignalEngine::new(&small_params()).unwrap();
    let mut series = bars(&jump_closes(12.0), &[]);
    let last = series[6].clone();

    // Same timestamp, later in the input: discarded.
    series.push(Bar {
        close: 8.0,
        low: 7.0,
        ..last.clone()
    });
    // Newer bar without a close: discarded.
    series.push(Bar {
        timestamp: last.timestamp + Duration::minutes(5),
        close: f64::NAN,
        ..last
    });
    series.rotate_left(3);

    assert_eq!(engine.get_signal(&series, 12.0).decision, Decision::Buy);
}

#[test]
fn short_series_with_default_parameters_holds() {
    let engine = SignalEngine::new(&StrategyParameters::default()).unwrap();
    let series = bars(&falling_closes(), &[]);
    assert_eq!(engine.get_signal(&series, 9.0).decision, Decision::Hold);
    assert!(engine.get_signal(&[], 9.0).reason.contains("no usable bars"));
}
