//! End-to-end flow over real HTTP against a wiremock ledger.
//!
//! The mock server speaks the older field names (`credits`,
//! `remaining_credits`, numeric user ids) to make sure the aliases hold.

use credit_sync::adapters::mock::RecordingDisplaySink;
use credit_sync::adapters::ReqwestHttpClient;
use credit_sync::client::{ClientState, CreditSyncClient, InitOutcome, ReconcileOutcome};
use credit_sync::config::SyncConfig;
use credit_sync::error::{CreditSyncError, NetworkError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_ledger(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/user-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authenticated": true,
            "user_id": 42,
            "credits": 10,
            "credits_used": 240,
            "original_credits": 250
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/sync-credits"))
        .and(query_param("user_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "credits": 10
        })))
        .mount(server)
        .await;
}

fn client_for(config: SyncConfig, sink: &RecordingDisplaySink) -> CreditSyncClient {
    let http = ReqwestHttpClient::with_timeout(config.request_timeout).unwrap();
    CreditSyncClient::new(config, Arc::new(http), Arc::new(sink.clone()))
}

async fn wait_for_received(server: &MockServer, route: &str, count: usize) -> bool {
    for _ in 0..100 {
        let received = server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == route)
            .count();
        if received >= count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let ledger = MockServer::start().await;
    let mirror = MockServer::start().await;
    mount_ledger(&ledger).await;

    Mock::given(method("POST"))
        .and(path("/api/sync-credits"))
        .and(header("X-API-Key", "ledger-key"))
        .and(body_partial_json(json!({
            "user_id": "42",
            "amount": 3,
            "action_tag": "generation"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "remaining_credits": 7,
            "total_credits_used": 243
        })))
        .expect(1)
        .mount(&ledger)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/sync"))
        .and(body_partial_json(json!({
            "user_id": "42",
            "app_tag": "penora",
            "amount_used": 3,
            "total_used": 243,
            "remaining_balance": 7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&mirror)
        .await;

    let config = SyncConfig::with_ledger_base_url(&ledger.uri())
        .with_mirror_url(format!("{}/api/sync", mirror.uri()))
        .with_api_key("ledger-key");
    let sink = RecordingDisplaySink::new();
    let client = client_for(config, &sink);

    assert_eq!(client.initialize().await, InitOutcome::Ready);
    let session = client.session().unwrap();
    assert_eq!(session.user_id, "42");
    assert_eq!(session.balance, Some(10));
    assert_eq!(session.credits_used_total, 240);

    let settlement = client
        .reserve_and_settle(3, "3 Page(s): A quiet harbour...")
        .await
        .unwrap();
    assert_eq!(settlement.balance, Some(7));
    assert_eq!(settlement.credits_used_total, 243);
    assert_eq!(sink.displayed_balance(), Some(7));

    assert!(wait_for_received(&mirror, "/api/sync", 1).await);
    client.stop();
}

#[tokio::test]
async fn test_insufficient_credits_over_http() {
    let ledger = MockServer::start().await;
    mount_ledger(&ledger).await;

    Mock::given(method("POST"))
        .and(path("/api/sync-credits"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Insufficient credits"
        })))
        .mount(&ledger)
        .await;

    let sink = RecordingDisplaySink::new();
    let client = client_for(SyncConfig::with_ledger_base_url(&ledger.uri()), &sink);
    client.initialize().await;

    let err = client.reserve_and_settle(50, "50 Page(s)").await.unwrap_err();
    assert_eq!(
        err,
        CreditSyncError::LedgerRejected {
            reason: "Insufficient credits".to_string()
        }
    );
    assert_eq!(sink.displayed_balance(), Some(10));

    client.stop();
}

#[tokio::test]
async fn test_slow_ledger_times_out() {
    let ledger = MockServer::start().await;
    mount_ledger(&ledger).await;

    Mock::given(method("POST"))
        .and(path("/api/sync-credits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "remaining_credits": 1 }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&ledger)
        .await;

    let config = SyncConfig::with_ledger_base_url(&ledger.uri())
        .with_request_timeout(Duration::from_millis(200));
    let sink = RecordingDisplaySink::new();
    let client = client_for(config, &sink);
    client.initialize().await;

    let err = client.reserve_and_settle(1, "x").await.unwrap_err();
    assert!(
        matches!(err, CreditSyncError::Network(NetworkError::Timeout { .. })),
        "{:?}",
        err
    );
    assert!(err.is_deduction_failure());
    assert_eq!(sink.displayed_balance(), Some(10));

    client.stop();
}

#[tokio::test]
async fn test_unreachable_ledger_never_raises_from_reconcile() {
    // Bind and drop a server to get a port nobody listens on.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let sink = RecordingDisplaySink::new();
    let client = client_for(SyncConfig::with_ledger_base_url(&uri), &sink);

    assert_eq!(client.initialize().await, InitOutcome::Deferred);
    assert_eq!(client.state(), ClientState::Error);
    assert_eq!(client.refresh().await, ReconcileOutcome::Failed);
    assert_eq!(sink.update_count(), 0);

    client.stop();
}
