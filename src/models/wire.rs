//! JSON payloads exchanged with the session, ledger and mirror endpoints.
//!
//! Field names are snake_case; aliases accept the older `credits`-style names
//! the services still emit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::DEFAULT_CREDITS_ORIGINAL;

/// Response from the session-status endpoint (GET).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    #[serde(default)]
    pub authenticated: bool,
    /// Accepts string or numeric ids.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<String>,
    #[serde(default, alias = "credits")]
    pub balance: Option<u64>,
    #[serde(default, alias = "credits_used")]
    pub credits_used_total: Option<u64>,
    #[serde(default, alias = "original_credits")]
    pub credits_original: Option<u64>,
}

impl SessionStatusResponse {
    pub fn credits_original_or_default(&self) -> u64 {
        self.credits_original.unwrap_or(DEFAULT_CREDITS_ORIGINAL)
    }
}

/// Response from the ledger reconciliation endpoint (GET).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "credits")]
    pub balance: Option<u64>,
    #[serde(default, alias = "credits_used", alias = "total_credits_used")]
    pub credits_used_total: Option<u64>,
    #[serde(default, alias = "error")]
    pub reason: Option<String>,
}

/// Body of the ledger deduction request (POST).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductRequest {
    pub user_id: String,
    pub amount: u64,
    pub description: String,
    pub action_tag: String,
    pub correlation_id: String,
}

/// Response from the ledger deduction endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeductResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "remaining_credits", alias = "new_balance")]
    pub remaining_balance: Option<u64>,
    #[serde(default, alias = "credits_used_total")]
    pub total_credits_used: Option<u64>,
    #[serde(default, alias = "error", alias = "message")]
    pub reason: Option<String>,
}

/// Best-effort transaction summary sent to the mirror service (POST).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorForward {
    pub user_id: String,
    pub app_tag: String,
    pub amount_used: u64,
    pub total_used: u64,
    pub remaining_balance: u64,
    pub timestamp: DateTime<Utc>,
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
