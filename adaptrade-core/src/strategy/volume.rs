//! Volume confirmation for entry signals.
//!
//! The latest bar's volume must reach `spike_factor` times the mean volume of
//! the preceding bars in the window. A series with no volume at all, a window
//! too short to judge, or a zero baseline confirms. Volume missing on the
//! latest bar, or on every history bar of a series that does carry volume,
//! rejects.

use crate::domain::PreparedBars;

/// Smallest window (including the latest bar) the filter will judge.
const MIN_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeCheck {
    Confirmed,
    Rejected { actual: f64, required: f64 },
    /// The series carries volume, but not where the comparison needs it.
    Missing { what: &'static str },
}

impl VolumeCheck {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, VolumeCheck::Confirmed)
    }
}

#[derive(Debug, Clone)]
pub struct VolumeConfirmation {
    pub window: usize,
    pub spike_factor: f64,
}

impl VolumeConfirmation {
    pub fn new(window: usize, spike_factor: f64) -> Self {
        Self {
            window,
            spike_factor,
        }
    }

    pub fn check(&self, bars: &PreparedBars) -> VolumeCheck {
        if !bars.has_volume() {
            return VolumeCheck::Confirmed;
        }
        let window = self.window.min(bars.len());
        if window < MIN_WINDOW {
            return VolumeCheck::Confirmed;
        }

        let recent = &bars[bars.len() - window..];
        let (history, current) = recent.split_at(window - 1);
        let Some(actual) = current.first().and_then(|bar| bar.volume) else {
            return VolumeCheck::Missing {
                what: "latest bar",
            };
        };

        let volumes: Vec<f64> = history.iter().filter_map(|bar| bar.volume).collect();
        if volumes.is_empty() {
            return VolumeCheck::Missing { what: "baseline" };
        }
        let baseline = volumes.iter().sum::<f64>() / volumes.len() as f64;
        if baseline == 0.0 {
            return VolumeCheck::Confirmed;
        }

        let required = baseline * self.spike_factor;
        if actual >= required {
            VolumeCheck::Confirmed
        } else {
            VolumeCheck::Rejected { actual, required }
        }
    }
}
