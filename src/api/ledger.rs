//! Ledger service client.

use std::sync::Arc;
use std::time::Duration;

use super::{default_headers, send_with_timeout, status_error, with_query};
use crate::config::SyncConfig;
use crate::error::NetworkError;
use crate::models::{DeductRequest, DeductResponse, ReconcileResponse, SessionStatusResponse};
use crate::traits::{Headers, HttpClient};

/// Client for the session-status and ledger endpoints.
#[derive(Clone)]
pub struct LedgerApi {
    http: Arc<dyn HttpClient>,
    session_status_url: String,
    reconcile_url: String,
    deduct_url: String,
    headers: Headers,
    timeout: Duration,
}

impl LedgerApi {
    pub fn new(http: Arc<dyn HttpClient>, config: &SyncConfig) -> Self {
        Self {
            http,
            session_status_url: config.session_status_url.clone(),
            reconcile_url: config.reconcile_url.clone(),
            deduct_url: config.deduct_url.clone(),
            headers: default_headers(config),
            timeout: config.request_timeout,
        }
    }

    /// Fetch identity and the balance the session endpoint knows about.
    ///
    /// GET {session_status_url}
    pub async fn fetch_session_status(&self) -> Result<SessionStatusResponse, NetworkError> {
        let url = &self.session_status_url;
        let response = send_with_timeout(
            "session status",
            url,
            self.timeout,
            self.http.get(url, &self.headers),
        )
        .await?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        Ok(response.json()?)
    }

    /// Read the current balance for `user_id`.
    ///
    /// GET {reconcile_url}?user_id=...
    pub async fn fetch_balance(&self, user_id: &str) -> Result<ReconcileResponse, NetworkError> {
        let url = with_query(&self.reconcile_url, "user_id", user_id);
        let response = send_with_timeout(
            "balance reconciliation",
            &url,
            self.timeout,
            self.http.get(&url, &self.headers),
        )
        .await?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        Ok(response.json()?)
    }

    /// Ask the ledger to deduct credits.
    ///
    /// POST {deduct_url}
    ///
    /// A non-2xx response whose body still parses as a deduction response is
    /// returned as that response, so the ledger's reason reaches the caller.
    pub async fn deduct(&self, request: &DeductRequest) -> Result<DeductResponse, NetworkError> {
        let url = &self.deduct_url;
        let body = serde_json::to_string(request).map_err(|e| NetworkError::Other {
            message: format!("Failed to encode deduction request: {}", e),
        })?;

        let response = send_with_timeout(
            "credit deduction",
            url,
            self.timeout,
            self.http.post(url, &body, &self.headers),
        )
        .await?;

        if response.is_success() {
            return Ok(response.json()?);
        }

        match response.json::<DeductResponse>() {
            Ok(parsed) if !parsed.success => Ok(parsed),
            _ => Err(status_error(&response)),
        }
    }
}

impl std::fmt::Debug for LedgerApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerApi")
            .field("session_status_url", &self.session_status_url)
            .field("reconcile_url", &self.reconcile_url)
            .field("deduct_url", &self.deduct_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::http::MockResponse;
    use crate::adapters::mock::MockHttpClient;
    use crate::traits::{HttpError, Response};
    use bytes::Bytes;

    const BASE: &str = "https://ledger.example.com";

    fn api(mock: &MockHttpClient) -> LedgerApi {
        LedgerApi::new(
            Arc::new(mock.clone()),
            &SyncConfig::with_ledger_base_url(BASE).with_api_key("key"),
        )
    }

    #[tokio::test]
    async fn test_fetch_session_status_sends_api_key() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/api/user-status", BASE),
            MockResponse::Success(Response::json_body(
                200,
                &serde_json::json!({"authenticated": true, "user_id": "u1", "credits": 10}),
            )),
        );

        let status = api(&mock).fetch_session_status().await.unwrap();
        assert!(status.authenticated);
        assert_eq!(status.balance, Some(10));

        let requests = mock.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].headers.get("X-API-Key"), Some(&"key".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_balance_appends_user_id() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/api/sync-credits", BASE),
            MockResponse::Success(Response::json_body(
                200,
                &serde_json::json!({"success": true, "credits": 4}),
            )),
        );

        let resp = api(&mock).fetch_balance("u1").await.unwrap();
        assert_eq!(resp.balance, Some(4));
        assert_eq!(
            mock.get_requests()[0].url,
            format!("{}/api/sync-credits?user_id=u1", BASE)
        );
    }

    #[tokio::test]
    async fn test_fetch_balance_non_success_status() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::new(
            503,
            Bytes::from("down"),
        )));

        let err = api(&mock).fetch_balance("u1").await.unwrap_err();
        assert!(matches!(err, NetworkError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_deduct_rejection_with_error_status_keeps_reason() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            402,
            &serde_json::json!({"success": false, "error": "insufficient"}),
        )));

        let request = DeductRequest {
            user_id: "u1".to_string(),
            amount: 5,
            description: "Image: cat".to_string(),
            action_tag: "generation".to_string(),
            correlation_id: "c-1".to_string(),
        };
        let resp = api(&mock).deduct(&request).await.unwrap();
        assert!(!resp.success);
        assert_eq!(resp.reason.as_deref(), Some("insufficient"));

        let sent: DeductRequest =
            serde_json::from_str(mock.get_requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, request);
    }

    #[tokio::test]
    async fn test_deduct_html_error_page_is_network_error() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::new(
            500,
            Bytes::from("<html>oops</html>"),
        )));

        let request = DeductRequest {
            user_id: "u1".to_string(),
            amount: 1,
            description: String::new(),
            action_tag: "generation".to_string(),
            correlation_id: "c-2".to_string(),
        };
        let err = api(&mock).deduct(&request).await.unwrap_err();
        assert!(matches!(err, NetworkError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_transport_error_is_classified() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));

        let err = api(&mock).fetch_session_status().await.unwrap_err();
        assert!(matches!(err, NetworkError::ConnectionFailed { .. }));
    }
}
