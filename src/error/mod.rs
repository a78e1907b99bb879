//! Error handling for the credit-sync client.
//!
//! | Error | Surfaced to caller | Retryable |
//! |-------|--------------------|-----------|
//! | `Unauthenticated` | Yes (no request sent) | No |
//! | `Network` | Only from reservations | Depends on [`NetworkError::is_retryable`] |
//! | `LedgerRejected` | Yes | No |
//! | `MirrorForwardFailed` | Never, logged only | - |

mod network;
mod sync_error;

pub use network::NetworkError;
pub use sync_error::CreditSyncError;

/// Type alias for Results using [`CreditSyncError`].
pub type SyncResult<T> = Result<T, CreditSyncError>;
