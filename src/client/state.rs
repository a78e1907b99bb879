//! Client lifecycle states and operation outcomes.

use std::fmt;

/// Why the client stopped doing network work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    /// The session endpoint reported no signed-in user.
    Unauthenticated,
    /// `stop()` was called.
    Stopped,
}

/// Lifecycle of a [`CreditSyncClient`](super::CreditSyncClient).
///
/// ```text
/// Uninitialized -> Loading -> Ready <-> Syncing
///                               |  ^
///                               v  |
///                              Error
/// any -> Disabled(Stopped)        Loading -> Disabled(Unauthenticated)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Syncing,
    /// The last completed operation failed; the next success clears it.
    Error,
    Disabled(DisabledReason),
}

impl ClientState {
    pub fn is_disabled(&self) -> bool {
        matches!(self, ClientState::Disabled(_))
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, ClientState::Disabled(DisabledReason::Stopped))
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientState::Uninitialized => write!(f, "uninitialized"),
            ClientState::Loading => write!(f, "loading"),
            ClientState::Ready => write!(f, "ready"),
            ClientState::Syncing => write!(f, "syncing"),
            ClientState::Error => write!(f, "error"),
            ClientState::Disabled(DisabledReason::Unauthenticated) => {
                write!(f, "disabled (unauthenticated)")
            }
            ClientState::Disabled(DisabledReason::Stopped) => write!(f, "disabled (stopped)"),
        }
    }
}

/// Result of `initialize()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Identity loaded, timer armed.
    Ready,
    /// No signed-in user, or `stop()` ran during initialization. The client
    /// is a no-op from now on.
    Disabled,
    /// Identity fetch failed; the timer keeps retrying it.
    Deferred,
    /// `initialize()` already ran, or the client was stopped before it.
    AlreadyInitialized,
}

/// Result of one reconciliation attempt. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The ledger's figures replaced the cached session.
    Applied { balance: u64, credits_used_total: u64 },
    /// A newer snapshot was already applied; this one was dropped.
    Superseded,
    /// The request failed; cache and display are unchanged.
    Failed,
    /// Nothing to reconcile: no session, or the client is disabled.
    Skipped,
}
