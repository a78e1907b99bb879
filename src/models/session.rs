//! Cached session state and reservation types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credit grant assumed when the session endpoint does not report one.
pub const DEFAULT_CREDITS_ORIGINAL: u64 = 250;

/// Identity and cached ledger state for the current session.
///
/// Never mutated in place: every successful round trip produces a new
/// record that replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub authenticated: bool,
    /// Last-known credit count. A cache of the ledger, never authoritative.
    /// `None` until an endpoint has actually reported one.
    #[serde(default)]
    pub balance: Option<u64>,
    /// Lifetime usage as reported by the ledger.
    pub credits_used_total: u64,
    pub credits_original: u64,
    /// When the round trip that produced this record completed.
    pub synced_at: DateTime<Utc>,
}

impl UserSession {
    /// A new record for the same user carrying fresh ledger figures.
    pub fn with_ledger_figures(&self, balance: u64, credits_used_total: u64) -> Self {
        Self {
            user_id: self.user_id.clone(),
            authenticated: self.authenticated,
            balance: Some(balance),
            credits_used_total,
            credits_original: self.credits_original,
            synced_at: Utc::now(),
        }
    }
}

/// An in-flight billable action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub amount: u64,
    pub description: String,
    /// Stable for one logical action. Only a genuine retry gets a new one.
    pub correlation_id: String,
}

impl ReservationRequest {
    pub fn new(
        amount: u64,
        description: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            correlation_id: correlation_id.into(),
        }
    }
}

/// Outcome of a reservation the ledger accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub amount: u64,
    pub correlation_id: String,
    /// Balance reported by the ledger after the deduction. `None` when the
    /// ledger confirmed the deduction without a figure and the follow-up
    /// reconciliation failed too.
    pub balance: Option<u64>,
    pub credits_used_total: u64,
}
