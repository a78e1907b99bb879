//! Client configuration.
//!
//! Use the builder methods to customize endpoints and timing, or
//! [`SyncConfig::from_env`] to read `CREDIT_SYNC_*` variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::storage::default_cache_path;

/// Default base URL for the ledger service (session, reconcile, deduct).
pub const DEFAULT_LEDGER_BASE_URL: &str = "http://localhost:5000";

/// How often the balance is reconciled (the page refreshed every 15s).
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(15);

/// Upper bound for any single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How competing snapshots of the session are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotOrdering {
    /// Whichever round trip completes last wins.
    #[default]
    LastWriterWins,
    /// A snapshot from a request issued before the currently applied one
    /// is discarded.
    IssueOrder,
}

impl SnapshotOrdering {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "last-writer-wins" | "lww" => Some(SnapshotOrdering::LastWriterWins),
            "issue-order" | "sequenced" => Some(SnapshotOrdering::IssueOrder),
            _ => None,
        }
    }
}

/// Configuration for [`CreditSyncClient`](crate::client::CreditSyncClient).
///
/// # Example
///
/// ```ignore
/// use credit_sync::config::SyncConfig;
///
/// let config = SyncConfig::with_ledger_base_url("https://penora.example.com")
///     .with_mirror_url("https://main.example.com/api/apps/penora/sync")
///     .with_sync_interval(std::time::Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Identity endpoint, e.g. `/api/user-status`
    pub session_status_url: String,
    /// Ledger read endpoint, e.g. `/api/sync-credits` (GET)
    pub reconcile_url: String,
    /// Ledger deduction endpoint, e.g. `/api/sync-credits` (POST)
    pub deduct_url: String,
    /// Mirror endpoint; forwarding is skipped when unset
    pub mirror_url: Option<String>,
    /// Sent as `X-API-Key` when set
    pub api_key: Option<String>,
    /// Identifies this application to the mirror service
    pub app_tag: String,
    /// Action tag attached to every deduction
    pub action_tag: String,
    pub sync_interval: Duration,
    pub request_timeout: Duration,
    pub ordering: SnapshotOrdering,
    /// Warm-start cache file; disabled when unset. `from_env()` defaults it
    /// to [`default_cache_path`].
    pub cache_path: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::with_ledger_base_url(DEFAULT_LEDGER_BASE_URL)
    }
}

impl SyncConfig {
    /// Create a new SyncConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive every ledger endpoint from one base URL.
    pub fn with_ledger_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            session_status_url: format!("{}/api/user-status", base),
            reconcile_url: format!("{}/api/sync-credits", base),
            deduct_url: format!("{}/api/sync-credits", base),
            mirror_url: None,
            api_key: None,
            app_tag: "penora".to_string(),
            action_tag: "generation".to_string(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            ordering: SnapshotOrdering::default(),
            cache_path: None,
        }
    }

    pub fn with_session_status_url(mut self, url: impl Into<String>) -> Self {
        self.session_status_url = url.into();
        self
    }

    pub fn with_reconcile_url(mut self, url: impl Into<String>) -> Self {
        self.reconcile_url = url.into();
        self
    }

    pub fn with_deduct_url(mut self, url: impl Into<String>) -> Self {
        self.deduct_url = url.into();
        self
    }

    pub fn with_mirror_url(mut self, url: impl Into<String>) -> Self {
        self.mirror_url = Some(url.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_app_tag(mut self, tag: impl Into<String>) -> Self {
        self.app_tag = tag.into();
        self
    }

    pub fn with_action_tag(mut self, tag: impl Into<String>) -> Self {
        self.action_tag = tag.into();
        self
    }

    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_ordering(mut self, ordering: SnapshotOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_path = None;
        self
    }

    /// Build a config from `CREDIT_SYNC_*` environment variables.
    ///
    /// `CREDIT_SYNC_LEDGER_URL` sets the base for all ledger endpoints; the
    /// individual `*_URL` variables override single endpoints. Unparseable
    /// numeric values fall back to the defaults. The warm-start cache lives
    /// at [`default_cache_path`] unless `CREDIT_SYNC_CACHE_PATH` names
    /// another file, or is `off` to disable it.
    pub fn from_env() -> Self {
        let base = std::env::var("CREDIT_SYNC_LEDGER_URL")
            .unwrap_or_else(|_| DEFAULT_LEDGER_BASE_URL.to_string());
        let mut config = Self::with_ledger_base_url(&base);

        if let Ok(url) = std::env::var("CREDIT_SYNC_SESSION_URL") {
            config = config.with_session_status_url(url);
        }
        if let Ok(url) = std::env::var("CREDIT_SYNC_RECONCILE_URL") {
            config = config.with_reconcile_url(url);
        }
        if let Ok(url) = std::env::var("CREDIT_SYNC_DEDUCT_URL") {
            config = config.with_deduct_url(url);
        }
        if let Ok(url) = std::env::var("CREDIT_SYNC_MIRROR_URL") {
            config = config.with_mirror_url(url);
        }
        if let Ok(key) = std::env::var("CREDIT_SYNC_API_KEY") {
            config = config.with_api_key(key);
        }
        if let Ok(tag) = std::env::var("CREDIT_SYNC_APP_TAG") {
            config = config.with_app_tag(tag);
        }
        if let Some(secs) = env_u64("CREDIT_SYNC_INTERVAL_SECS").filter(|s| *s > 0) {
            config = config.with_sync_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = env_u64("CREDIT_SYNC_TIMEOUT_SECS").filter(|s| *s > 0) {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(ordering) = std::env::var("CREDIT_SYNC_ORDERING")
            .ok()
            .and_then(|v| SnapshotOrdering::parse(&v))
        {
            config = config.with_ordering(ordering);
        }
        config = match std::env::var("CREDIT_SYNC_CACHE_PATH") {
            Ok(path) if is_off(&path) => config.without_cache(),
            Ok(path) => config.with_cache_path(path),
            Err(_) => match default_cache_path() {
                Some(path) => config.with_cache_path(path),
                None => config,
            },
        };

        config
    }
}

fn is_off(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "off" | "none" | "0" | "false"
    )
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse().ok()
}
