//! Mirror service client.

use std::sync::Arc;
use std::time::Duration;

use super::{default_headers, send_with_timeout, status_error};
use crate::config::SyncConfig;
use crate::error::NetworkError;
use crate::models::MirrorForward;
use crate::traits::{Headers, HttpClient};

/// Forwards transaction summaries to the secondary mirror service.
///
/// Nothing it returns has transactional meaning; callers only log it.
#[derive(Clone)]
pub struct MirrorApi {
    http: Arc<dyn HttpClient>,
    url: String,
    headers: Headers,
    timeout: Duration,
}

impl MirrorApi {
    /// Returns `None` when no mirror endpoint is configured.
    pub fn from_config(http: Arc<dyn HttpClient>, config: &SyncConfig) -> Option<Self> {
        let url = config.mirror_url.clone()?;
        Some(Self {
            http,
            url,
            headers: default_headers(config),
            timeout: config.request_timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the summary. Any 2xx counts as delivered; the body is ignored.
    pub async fn forward(&self, summary: &MirrorForward) -> Result<(), NetworkError> {
        let body = serde_json::to_string(summary).map_err(|e| NetworkError::Other {
            message: format!("Failed to encode mirror summary: {}", e),
        })?;

        let response = send_with_timeout(
            "mirror forward",
            &self.url,
            self.timeout,
            self.http.post(&self.url, &body, &self.headers),
        )
        .await?;

        if response.is_success() {
            Ok(())
        } else {
            Err(status_error(&response))
        }
    }
}

impl std::fmt::Debug for MirrorApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorApi")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
