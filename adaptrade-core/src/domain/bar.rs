//! Bars and the prepared series the engines compute over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV sample for a single instrument.
///
/// Missing prices are carried as `f64::NAN`; missing volume as `None`.
/// Upstream ordering is not guaranteed, so nothing computes over raw bars
/// directly. Go through [`PreparedBars::prepare`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    /// True if any of high/low/close is missing, non-finite or not positive.
    ///
    /// Open is not required by any computation, so a bar with a missing open is still usable.
    pub fn is_void(&self) -> bool {
        ![self.high, self.low, self.close]
            .iter()
            .all(|price| price.is_finite() && *price > 0.0)
    }

    /// Volume if present, finite and non-negative.
    pub fn usable_volume(&self) -> Option<f64> {
        self.volume.filter(|v| v.is_finite() && *v >= 0.0)
    }
}

/// A chronological, deduplicated bar series with no void rows.
///
/// This is the only input type the indicator consumers in the engines accept,
/// which keeps the "sort before use" rule out of every call site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedBars {
    bars: Vec<Bar>,
}

impl PreparedBars {
    /// Sort by timestamp, drop duplicate timestamps (first occurrence wins),
    /// drop rows without a positive high/low/close and normalise unusable volume to `None`.
    pub fn prepare(raw: &[Bar]) -> Self {
        let mut bars: Vec<Bar> = raw
            .iter()
            .filter(|bar| !bar.is_void())
            .map(|bar| Bar {
                volume: bar.usable_volume(),
                ..bar.clone()
            })
            .collect();

        // Stable sort keeps upstream order among equal timestamps, so dedup keeps the first.
        bars.sort_by_key(|bar| bar.timestamp);
        bars.dedup_by_key(|bar| bar.timestamp);

        Self { bars }
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices in order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// True if at least one bar carries a usable volume.
    pub fn has_volume(&self) -> bool {
        self.bars.iter().any(|bar| bar.volume.is_some())
    }
}

impl std::ops::Deref for PreparedBars {
    type Target = [Bar];

    fn deref(&self) -> &[Bar] {
        &self.bars
    }
}
