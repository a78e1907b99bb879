//! Billable action source abstraction.
//!
//! Replaces "generate" button wiring with an explicit subscription: whoever
//! owns the UI publishes [`BillableAction`]s and the client answers each one
//! with the outcome of its reservation.

use futures::Stream;
use std::fmt;
use std::pin::Pin;
use tokio::sync::oneshot;

use crate::error::CreditSyncError;
use crate::models::Settlement;

/// Reply channel for a single billable action.
pub type ActionReply = oneshot::Sender<Result<Settlement, CreditSyncError>>;

/// Stream of billable actions handed to the client.
pub type ActionStream = Pin<Box<dyn Stream<Item = BillableAction> + Send>>;

/// A "billable action requested" event.
pub struct BillableAction {
    /// Credits to deduct.
    pub amount: u64,
    /// Audit label shown on the ledger.
    pub description: String,
    /// Where to send the reservation outcome, if anyone is listening.
    pub reply: Option<ActionReply>,
}

impl BillableAction {
    /// Create an action nobody waits on.
    pub fn new(amount: u64, description: impl Into<String>) -> Self {
        Self {
            amount,
            description: description.into(),
            reply: None,
        }
    }

    /// Create an action plus the receiver for its outcome.
    pub fn with_reply(
        amount: u64,
        description: impl Into<String>,
    ) -> (Self, oneshot::Receiver<Result<Settlement, CreditSyncError>>) {
        let (tx, rx) = oneshot::channel();
        let action = Self {
            amount,
            description: description.into(),
            reply: Some(tx),
        };
        (action, rx)
    }
}

impl fmt::Debug for BillableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BillableAction")
            .field("amount", &self.amount)
            .field("description", &self.description)
            .field("has_reply", &self.reply.is_some())
            .finish()
    }
}

/// Source of billable action events.
///
/// The client subscribes once, during `initialize()`, and processes the
/// stream sequentially until it ends or the client is stopped.
pub trait ActionSource: Send + Sync {
    /// Open the action stream. A source that can only be consumed once
    /// returns an empty stream on later calls.
    fn subscribe(&self) -> ActionStream;
}
