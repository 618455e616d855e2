//! Average Directional Index (ADX), Wilder smoothing.
//!
//! 1. +DM / -DM from consecutive highs and lows
//! 2. Wilder-smooth +DM, -DM and true range
//! 3. ±DI = 100 × smoothed DM / smoothed TR
//! 4. DX = 100 × |+DI − −DI| / (+DI + −DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! First valid ADX at index 2×period − 1.

use super::atr::true_range;
use super::{wilder_smooth, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone, Copy)]
pub struct Adx {
    period: usize,
}

/// ADX together with the directional indicators it is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// (+DM, -DM) per bar; index 0 is NaN.
fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let mut plus = vec![f64::NAN; bars.len()];
    let mut minus = vec![f64::NAN; bars.len()];
    for (i, pair) in bars.windows(2).enumerate() {
        let up = pair[1].high - pair[0].high;
        let down = pair[0].low - pair[1].low;
        if !(up.is_finite() && down.is_finite()) {
            continue;
        }
        plus[i + 1] = if up > down && up > 0.0 { up } else { 0.0 };
        minus[i + 1] = if down > up && down > 0.0 { down } else { 0.0 };
    }
    (plus, minus)
}

impl Indicator for Adx {
    type Output = AdxSeries;

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> AdxSeries {
        let n = bars.len();
        let (plus_dm, minus_dm) = directional_movement(bars);
        let tr = wilder_smooth(&true_range(bars), self.period);
        let plus_dm = wilder_smooth(&plus_dm, self.period);
        let minus_dm = wilder_smooth(&minus_dm, self.period);

        let mut plus_di = vec![f64::NAN; n];
        let mut minus_di = vec![f64::NAN; n];
        let mut dx = vec![f64::NAN; n];
        for i in 0..n {
            if !(tr[i].is_finite() && plus_dm[i].is_finite() && minus_dm[i].is_finite())
                || tr[i] == 0.0
            {
                continue;
            }
            plus_di[i] = 100.0 * plus_dm[i] / tr[i];
            minus_di[i] = 100.0 * minus_dm[i] / tr[i];
            let di_sum = plus_di[i] + minus_di[i];
            dx[i] = if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di[i] - minus_di[i]).abs() / di_sum
            };
        }

        AdxSeries {
            adx: wilder_smooth(&dx, self.period),
            plus_di,
            minus_di,
        }
    }
}
