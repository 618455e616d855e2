//! Indicator library.
//!
//! Indicators are pure functions: bar history in, series of the same length out.
//! Positions inside the warmup window are `f64::NAN`. Multi-line indicators
//! return typed structs with one named field per line, so callers never look a
//! column up by name.
//!
//! Every period is explicit at construction; there are no library defaults.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod rsi;
pub mod sma;

pub use adx::{Adx, AdxSeries};
pub use atr::{true_range, Atr};
pub use bollinger::{Bollinger, BollingerSeries};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Bar;

/// A technical indicator over a bar series.
///
/// # Look-ahead guard
/// The value at bar t may only depend on bars `0..=t`. Computing over a
/// truncated series must reproduce the prefix of the full-series output.
pub trait Indicator {
    type Output;

    /// Number of leading positions that are always NaN.
    fn lookback(&self) -> usize;

    /// Compute over the whole series.
    fn compute(&self, bars: &[Bar]) -> Self::Output;
}

/// Value at the final position, if it is finite.
pub fn latest(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| v.is_finite())
}

/// Value one position before the end, if it is finite.
pub fn previous(series: &[f64]) -> Option<f64> {
    series
        .len()
        .checked_sub(2)
        .and_then(|i| series.get(i))
        .copied()
        .filter(|v| v.is_finite())
}

/// Wilder smoothing (RMA, alpha = 1/period).
///
/// Seeded with the mean of the first run of `period` consecutive finite values;
/// a non-finite value after the seed ends the series (everything after is NaN).
pub(crate) fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    let Some(start) = first_finite_run(values, period) else {
        return out;
    };

    let seed_end = start + period;
    let mut smoothed = values[start..seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end - 1] = smoothed;

    let alpha = 1.0 / period as f64;
    for (i, &value) in values.iter().enumerate().skip(seed_end) {
        if !value.is_finite() {
            break;
        }
        smoothed += alpha * (value - smoothed);
        out[i] = smoothed;
    }
    out
}

/// Start index of the first run of `len` consecutive finite values.
fn first_finite_run(values: &[f64], len: usize) -> Option<usize> {
    let mut run = 0;
    for (i, value) in values.iter().enumerate() {
        if value.is_finite() {
            run += 1;
            if run == len {
                return Some(i + 1 - len);
            }
        } else {
            run = 0;
        }
    }
    None
}

/// Synthetic bars from close prices for testing.
///
/// open = previous close, high/low = max/min(open, close) ± 1, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::{Duration, TimeZone, Utc};
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
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
                volume: Some(1000.0),
            }
        })
        .collect()
}

/// Synthetic bars from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    use chrono::{Duration, TimeZone, Utc};
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            timestamp: start + Duration::minutes(5 * i as i64),
            open,
            high,
            low,
            close,
            volume: Some(1000.0),
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
