//! Error type surfaced by the credit-sync client.

use thiserror::Error;

use super::network::NetworkError;

/// Errors produced by [`CreditSyncClient`](crate::client::CreditSyncClient).
///
/// Only reservation failures ever reach a caller. Reconciliation and mirror
/// failures are logged inside the client and never returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreditSyncError {
    /// No authenticated session; no request was sent.
    #[error("Not authenticated - no credit session available")]
    Unauthenticated,

    /// Transport-level failure talking to a remote endpoint.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// The ledger answered `success: false`.
    #[error("Ledger rejected the deduction: {reason}")]
    LedgerRejected { reason: String },

    /// Mirror forwarding failed. Only ever logged.
    #[error("Mirror forward failed: {0}")]
    MirrorForwardFailed(NetworkError),

    /// Reservation amounts must be positive.
    #[error("Invalid reservation amount: {0}")]
    InvalidAmount(u64),

    /// The client was stopped before the operation started.
    #[error("Credit sync client has been stopped")]
    Stopped,
}

impl CreditSyncError {
    /// Whether this error means a deduction did not happen.
    ///
    /// When true, the billable action must not be performed and the
    /// previously displayed balance is still correct.
    pub fn is_deduction_failure(&self) -> bool {
        matches!(
            self,
            CreditSyncError::Network(_) | CreditSyncError::LedgerRejected { .. }
        )
    }

    /// The ledger's reason for rejecting a deduction, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            CreditSyncError::LedgerRejected { reason } => Some(reason.as_str()),
            _ => None,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            CreditSyncError::Unauthenticated => "E_CREDIT_UNAUTH",
            CreditSyncError::Network(err) => err.error_code(),
            CreditSyncError::LedgerRejected { .. } => "E_CREDIT_REJECTED",
            CreditSyncError::MirrorForwardFailed(_) => "E_CREDIT_MIRROR",
            CreditSyncError::InvalidAmount(_) => "E_CREDIT_AMOUNT",
            CreditSyncError::Stopped => "E_CREDIT_STOPPED",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            CreditSyncError::Unauthenticated => {
                "Please sign in to use credits.".to_string()
            }
            CreditSyncError::Network(err) => err.user_message(),
            CreditSyncError::LedgerRejected { reason } => {
                format!("Credit deduction failed: {}", reason)
            }
            CreditSyncError::MirrorForwardFailed(_) => {
                "Usage could not be reported to the main site. Your balance is unaffected."
                    .to_string()
            }
            CreditSyncError::InvalidAmount(_) => {
                "The requested action has no credit cost.".to_string()
            }
            CreditSyncError::Stopped => "Credit sync is no longer running.".to_string(),
        }
    }
}
