//! Presentation helpers for display sinks.
//!
//! The client never formats anything; these helpers exist so concrete sinks
//! render balances consistently.

use std::fmt;

/// Coarse balance classification used to colour balance badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceLevel {
    /// More than 10 credits.
    Healthy,
    /// 6 to 10 credits.
    Low,
    /// 5 credits or fewer.
    Critical,
}

impl BalanceLevel {
    pub fn of(balance: u64) -> Self {
        if balance > 10 {
            BalanceLevel::Healthy
        } else if balance > 5 {
            BalanceLevel::Low
        } else {
            BalanceLevel::Critical
        }
    }

    /// Hint shown next to a low balance, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            BalanceLevel::Healthy => None,
            BalanceLevel::Low => Some("Low credit balance - consider topping up"),
            BalanceLevel::Critical => Some("Very low credit balance - top up recommended"),
        }
    }
}

impl fmt::Display for BalanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BalanceLevel::Healthy => "healthy",
            BalanceLevel::Low => "low",
            BalanceLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// "1 credit", "7 credits".
pub fn format_credits(credits: u64) -> String {
    if credits == 1 {
        "1 credit".to_string()
    } else {
        format!("{} credits", credits)
    }
}
