//! Correlation ids and snapshot sequence numbers.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates correlation ids of the form `{tag}_{unix_millis}_{n}`.
///
/// The counter makes ids unique even when two reservations start within the
/// same millisecond.
#[derive(Debug)]
pub(crate) struct CorrelationIds {
    tag: String,
    counter: AtomicU64,
}

impl CorrelationIds {
    pub(crate) fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub(crate) fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}_{}_{}", self.tag, Utc::now().timestamp_millis(), n)
    }
}

/// Monotonic sequence stamped on every request when it is issued.
#[derive(Debug, Default)]
pub(crate) struct IssueSequence(AtomicU64);

impl IssueSequence {
    /// Next sequence number, starting at 1.
    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}
