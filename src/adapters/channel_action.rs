//! Channel-backed action source.
//!
//! UI code keeps an [`ActionTrigger`] and fires billable actions through it;
//! the client consumes them from the paired [`ChannelActionSource`].

use futures::stream;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::error::CreditSyncError;
use crate::models::Settlement;
use crate::traits::{ActionSource, ActionStream, BillableAction};

/// Sending half: requests billable actions.
#[derive(Debug, Clone)]
pub struct ActionTrigger {
    tx: mpsc::UnboundedSender<BillableAction>,
}

impl ActionTrigger {
    /// Fire an action without waiting for its outcome.
    ///
    /// Returns false once nobody is listening any more.
    pub fn fire(&self, amount: u64, description: impl Into<String>) -> bool {
        self.tx.send(BillableAction::new(amount, description)).is_ok()
    }

    /// Fire an action and get a receiver for its reservation outcome.
    ///
    /// Returns `None` when nobody is listening.
    pub fn request(
        &self,
        amount: u64,
        description: impl Into<String>,
    ) -> Option<oneshot::Receiver<Result<Settlement, CreditSyncError>>> {
        let (action, rx) = BillableAction::with_reply(amount, description);
        self.tx.send(action).ok().map(|_| rx)
    }
}

/// Receiving half, handed to the client. Can be subscribed to once.
#[derive(Debug)]
pub struct ChannelActionSource {
    rx: Mutex<Option<mpsc::UnboundedReceiver<BillableAction>>>,
}

impl ChannelActionSource {
    pub fn new() -> (Self, ActionTrigger) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                rx: Mutex::new(Some(rx)),
            },
            ActionTrigger { tx },
        )
    }
}

impl ActionSource for ChannelActionSource {
    fn subscribe(&self) -> ActionStream {
        let rx = match self.rx.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match rx {
            Some(rx) => Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|action| (action, rx))
            })),
            None => {
                tracing::warn!("Action source already subscribed; returning empty stream");
                Box::pin(stream::empty())
            }
        }
    }
}
