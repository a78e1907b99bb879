//! Display sink abstraction.
//!
//! The client only hands out numbers. Which elements get updated, how the
//! balance is formatted and how low balances are highlighted is entirely the
//! sink's business.

use std::sync::Arc;

/// Receiver of balance updates.
///
/// Called after the session record has been fully replaced, never with a
/// half-applied snapshot. Implementations must not block: the call happens on
/// the task that completed the network round trip.
pub trait DisplaySink: Send + Sync {
    /// Push the current balance and lifetime usage to the presentation layer.
    fn update(&self, balance: u64, usage_total: u64);
}

impl<T: DisplaySink + ?Sized> DisplaySink for Arc<T> {
    fn update(&self, balance: u64, usage_total: u64) {
        (**self).update(balance, usage_total)
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn update(&self, balance: u64, usage_total: u64) {
        (**self).update(balance, usage_total)
    }
}

/// A sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplaySink;

impl DisplaySink for NullDisplaySink {
    fn update(&self, _balance: u64, _usage_total: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Last(Mutex<Option<(u64, u64)>>);

    impl DisplaySink for Last {
        fn update(&self, balance: u64, usage_total: u64) {
            *self.0.lock().unwrap() = Some((balance, usage_total));
        }
    }

    #[test]
    fn test_arc_forwards_updates() {
        let inner = Arc::new(Last(Mutex::new(None)));
        let sink: Arc<dyn DisplaySink> = inner.clone();
        sink.update(7, 13);
        assert_eq!(*inner.0.lock().unwrap(), Some((7, 13)));
    }

    #[test]
    fn test_null_sink_accepts_updates() {
        NullDisplaySink.update(1, 2);
    }
}
