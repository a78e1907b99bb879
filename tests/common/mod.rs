//! Common test utilities for integration tests.
//!
//! Fixture payloads for the ledger endpoints plus a harness that wires a
//! [`CreditSyncClient`] to a [`MockHttpClient`] and a recording sink.
//!
//! # Example
//!
//! ```ignore
//! let h = Harness::signed_in(10);
//! h.client.initialize().await;
//! assert_eq!(h.sink.displayed_balance(), Some(10));
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use credit_sync::client::CreditSyncClient;
use credit_sync::config::SyncConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const SESSION_URL: &str = "http://ledger.test/api/user-status";
pub const BALANCE_URL: &str = "http://ledger.test/api/balance";
pub const DEDUCT_URL: &str = "http://ledger.test/api/deduct";
pub const MIRROR_URL: &str = "http://mirror.test/api/transactions";

pub const TEST_USER: &str = "user-42";

/// Config pointing every endpoint at the mock hosts, mirror included.
pub fn test_config() -> SyncConfig {
    SyncConfig::new()
        .with_session_status_url(SESSION_URL)
        .with_reconcile_url(BALANCE_URL)
        .with_deduct_url(DEDUCT_URL)
        .with_mirror_url(MIRROR_URL)
        .with_sync_interval(Duration::from_secs(15))
}

/// Session-status body for a signed-in user.
pub fn session_status(balance: u64, used: u64) -> Value {
    json!({
        "authenticated": true,
        "user_id": TEST_USER,
        "balance": balance,
        "credits_used_total": used,
        "credits_original": 250
    })
}

/// Session-status body that names the user but carries no balance.
pub fn identity_only() -> Value {
    json!({ "authenticated": true, "user_id": TEST_USER })
}

/// Session-status body for a visitor.
pub fn signed_out() -> Value {
    json!({ "authenticated": false })
}

/// Reconciliation body.
pub fn ledger_balance(balance: u64, used: u64) -> Value {
    json!({ "success": true, "balance": balance, "credits_used_total": used })
}

/// Successful deduction body.
pub fn deduct_ok(remaining: u64, used: u64) -> Value {
    json!({ "success": true, "remaining_balance": remaining, "total_credits_used": used })
}

/// Rejected deduction body.
pub fn deduct_rejected(reason: &str) -> Value {
    json!({ "success": false, "reason": reason })
}

/// A client plus the doubles it talks to.
pub struct Harness {
    pub client: CreditSyncClient,
    pub http: MockHttpClient,
    pub sink: RecordingDisplaySink,
}

impl Harness {
    pub fn new(config: SyncConfig) -> Self {
        let http = MockHttpClient::new();
        let sink = RecordingDisplaySink::new();
        let client = CreditSyncClient::new(config, Arc::new(http.clone()), Arc::new(sink.clone()));
        Self { client, http, sink }
    }

    /// Harness whose session and ledger agree on `balance`; the mirror
    /// accepts everything.
    pub fn signed_in(balance: u64) -> Self {
        let harness = Self::new(test_config());
        harness.http.set_response(SESSION_URL, json_response(200, session_status(balance, 0)));
        harness.http.set_response(BALANCE_URL, json_response(200, ledger_balance(balance, 0)));
        harness.http.set_response(MIRROR_URL, json_response(200, json!({ "ok": true })));
        harness
    }

    pub fn requests_to(&self, url: &str) -> usize {
        self.http.requests_to(url).len()
    }
}

/// Poll until `count` requests to `url` were recorded, or give up after a
/// second. Detached tasks (mirror forwards, timer ticks) need this.
pub async fn wait_for_requests(http: &MockHttpClient, url: &str, count: usize) -> bool {
    for _ in 0..200 {
        if http.requests_to(url).len() >= count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    http.requests_to(url).len() >= count
}

/// Let spawned tasks run without moving time forward meaningfully.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
