//! Recording display sink for tests.

use std::sync::{Arc, Mutex};

use crate::traits::DisplaySink;

/// Display sink that remembers every update it receives.
///
/// Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplaySink {
    updates: Arc<Mutex<Vec<(u64, u64)>>>,
}

impl RecordingDisplaySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(balance, usage_total)` pair, oldest first.
    pub fn updates(&self) -> Vec<(u64, u64)> {
        self.updates.lock().unwrap().clone()
    }

    /// The balance currently "on screen", if anything was ever shown.
    pub fn displayed_balance(&self) -> Option<u64> {
        self.updates.lock().unwrap().last().map(|(balance, _)| *balance)
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

impl DisplaySink for RecordingDisplaySink {
    fn update(&self, balance: u64, usage_total: u64) {
        self.updates.lock().unwrap().push((balance, usage_total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let sink = RecordingDisplaySink::new();
        assert_eq!(sink.displayed_balance(), None);

        sink.update(10, 0);
        sink.clone().update(7, 3);

        assert_eq!(sink.updates(), vec![(10, 0), (7, 3)]);
        assert_eq!(sink.displayed_balance(), Some(7));
        assert_eq!(sink.update_count(), 2);
    }
}
