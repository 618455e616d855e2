use std::collections::HashMap;

use crate::domain::InstrumentId;

/// Entries taken per instrument since the last reset.
#[derive(Debug, Clone, Default)]
pub struct DailyTradeCounter {
    counts: HashMap<InstrumentId, u32>,
}

impl DailyTradeCounter {
    /// Increment and return the new count.
    pub fn record(&mut self, instrument: &InstrumentId) -> u32 {
        let count = self.counts.entry(instrument.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn count(&self, instrument: &InstrumentId) -> u32 {
        self.counts.get(instrument).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_instrument() {
        let mut counter = DailyTradeCounter::default();
        let a = InstrumentId::new("A");
        let b = InstrumentId::new("B");
        assert_eq!(counter.record(&a), 1);
        assert_eq!(counter.record(&a), 2);
        assert_eq!(counter.record(&b), 1);
        assert_eq!(counter.total(), 3);
        counter.reset();
        assert_eq!(counter.count(&a), 0);
        assert_eq!(counter.total(), 0);
    }
}
