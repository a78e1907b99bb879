//! Display sinks for headless use: the terminal and the log.

use std::io::Write;

use crate::display::{format_credits, BalanceLevel};
use crate::traits::DisplaySink;

/// Writes one line per balance update to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleDisplaySink;

impl ConsoleDisplaySink {
    /// The line printed for an update.
    pub fn render(balance: u64, usage_total: u64) -> String {
        let level = BalanceLevel::of(balance);
        let mut line = format!(
            "{} remaining ({} used) [{}]",
            format_credits(balance),
            usage_total,
            level
        );
        if let Some(hint) = level.hint() {
            line.push_str(" - ");
            line.push_str(hint);
        }
        line
    }
}

impl DisplaySink for ConsoleDisplaySink {
    fn update(&self, balance: u64, usage_total: u64) {
        let line = Self::render(balance, usage_total);
        let mut stdout = std::io::stdout().lock();
        if writeln!(stdout, "{}", line).is_err() {
            tracing::debug!("stdout closed, dropping balance update");
        }
    }
}

/// Emits every balance update as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDisplaySink;

impl DisplaySink for TracingDisplaySink {
    fn update(&self, balance: u64, usage_total: u64) {
        match BalanceLevel::of(balance) {
            BalanceLevel::Healthy => {
                tracing::info!(balance, usage_total, "Credit balance updated")
            }
            level => tracing::warn!(balance, usage_total, %level, "Credit balance is low"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_healthy() {
        assert_eq!(
            ConsoleDisplaySink::render(120, 130),
            "120 credits remaining (130 used) [healthy]"
        );
    }

    #[test]
    fn test_render_critical_includes_hint() {
        let line = ConsoleDisplaySink::render(1, 249);
        assert!(line.starts_with("1 credit remaining"));
        assert!(line.contains("[critical]"));
        assert!(line.contains("top up recommended"));
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        TracingDisplaySink.update(3, 7);
        TracingDisplaySink.update(300, 7);
    }
}
