//! Background tasks owned by the client: the periodic refresh timer and the
//! billable action listener.
//!
//! Both tasks hold a [`Weak`] reference to the client so that dropping every
//! handle lets them wind down, and both watch the shutdown channel that
//! `stop()` signals.

use futures::StreamExt;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{CreditSyncClient, Inner};
use crate::traits::ActionStream;

/// Wait until the shutdown flag flips to true or its sender is dropped.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Spawn the periodic refresh timer.
///
/// The first tick fires one `period` after arming. Each tick spawns its own
/// refresh so a slow ledger never delays the schedule and `stop()` never
/// cancels a request that is already on the wire.
pub(super) fn spawn_periodic_sync(
    inner: Weak<Inner>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Credit sync timer started (interval: {:?})", period);

        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                _ = interval.tick() => {
                    let Some(inner) = inner.upgrade() else {
                        tracing::debug!("Credit sync client dropped, stopping timer");
                        break;
                    };
                    let client = CreditSyncClient { inner };
                    tokio::spawn(async move {
                        let outcome = client.refresh().await;
                        tracing::trace!("Periodic refresh finished: {:?}", outcome);
                    });
                }
            }
        }

        tracing::debug!("Credit sync timer stopped");
    })
}

/// Spawn the listener that turns billable action events into reservations.
///
/// Actions are settled one at a time, in arrival order. Each outcome is sent
/// back on the action's reply channel when it has one.
pub(super) fn spawn_action_listener(
    inner: Weak<Inner>,
    mut actions: ActionStream,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::debug!("Billable action listener attached");

        loop {
            let action = tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                next = actions.next() => match next {
                    Some(action) => action,
                    None => {
                        tracing::debug!("Action source closed");
                        break;
                    }
                },
            };

            let Some(inner) = inner.upgrade() else {
                break;
            };
            let client = CreditSyncClient { inner };

            let result = client
                .reserve_and_settle(action.amount, &action.description)
                .await;

            if let Err(e) = &result {
                tracing::warn!(
                    "Billable action '{}' was not charged: {}",
                    action.description,
                    e
                );
            }

            if let Some(reply) = action.reply {
                if reply.send(result).is_err() {
                    tracing::debug!("Action reply receiver dropped");
                }
            }
        }

        tracing::debug!("Billable action listener detached");
    })
}
