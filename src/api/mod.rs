//! HTTP contracts of the remote collaborators.
//!
//! - [`LedgerApi`] - session status, balance reconciliation, deduction
//! - [`MirrorApi`] - best-effort transaction forwarding
//!
//! Both sit on top of an injected [`HttpClient`] and bound every request by
//! the configured timeout, whatever the transport's own defaults are.

mod ledger;
mod mirror;

pub use ledger::LedgerApi;
pub use mirror::MirrorApi;

use std::future::Future;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::error::NetworkError;
use crate::traits::{Headers, HttpError, Response};

/// Headers sent with every request.
pub(crate) fn default_headers(config: &SyncConfig) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    if let Some(ref key) = config.api_key {
        headers.insert("X-API-Key".to_string(), key.clone());
    }
    headers
}

/// Run a request future with an upper time bound.
///
/// Expiry is reported as [`NetworkError::Timeout`], which callers treat as a
/// transient failure like any other transport error.
pub(crate) async fn send_with_timeout<F>(
    operation: &str,
    url: &str,
    timeout: Duration,
    request: F,
) -> Result<Response, NetworkError>
where
    F: Future<Output = Result<Response, HttpError>>,
{
    match tokio::time::timeout(timeout, request).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(err)) => Err(NetworkError::from_http(err, url)),
        Err(_) => Err(NetworkError::Timeout {
            operation: operation.to_string(),
            duration_secs: timeout.as_secs(),
        }),
    }
}

/// Error for a non-2xx response whose body carried nothing usable.
pub(crate) fn status_error(response: &Response) -> NetworkError {
    let message = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    NetworkError::HttpStatus {
        status: response.status,
        message: truncate(&message, 200),
    }
}

/// Append a query parameter, keeping any existing query string.
pub(crate) fn with_query(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, key, urlencoding::encode(value))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
