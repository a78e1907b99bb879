//! The credit-sync client.
//!
//! [`CreditSyncClient`] owns the cached [`UserSession`], talks to the ledger
//! and mirror endpoints, runs the periodic refresh timer and turns billable
//! actions into reservations. Every balance it shows comes from a ledger
//! response; nothing is ever computed locally.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use credit_sync::adapters::{ReqwestHttpClient, TracingDisplaySink};
//! use credit_sync::client::CreditSyncClient;
//! use credit_sync::config::SyncConfig;
//!
//! let config = SyncConfig::from_env();
//! let http = Arc::new(ReqwestHttpClient::with_timeout(config.request_timeout)?);
//! let client = CreditSyncClient::new(config, http, Arc::new(TracingDisplaySink));
//!
//! client.initialize().await;
//! let settlement = client.reserve_and_settle(3, "3 Page(s): A story...").await?;
//! ```

mod ids;
mod state;
mod tasks;

pub use state::{ClientState, DisabledReason, InitOutcome, ReconcileOutcome};

use chrono::Utc;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{LedgerApi, MirrorApi};
use crate::config::{SnapshotOrdering, SyncConfig};
use crate::cost::truncate_description;
use crate::display::format_credits;
use crate::error::{CreditSyncError, SyncResult};
use crate::models::{DeductRequest, MirrorForward, ReservationRequest, Settlement, UserSession};
use crate::storage::BalanceCache;
use crate::traits::{ActionSource, DisplaySink, HttpClient, NullDisplaySink};
use ids::{CorrelationIds, IssueSequence};

/// Mutable client state. Guarded by a std lock that is never held across an
/// `.await`.
#[derive(Debug, Default)]
struct Core {
    state: ClientState,
    session: Option<UserSession>,
    /// Operations issued but not yet completed.
    in_flight: usize,
    /// Issue sequence of the snapshot currently applied.
    applied_seq: u64,
}

/// Handles of the background tasks.
struct Background {
    shutdown: watch::Sender<bool>,
    timer: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
}

struct Inner {
    config: SyncConfig,
    ledger: LedgerApi,
    mirror: Option<MirrorApi>,
    sink: Arc<dyn DisplaySink>,
    actions: Option<Arc<dyn ActionSource>>,
    cache: Option<BalanceCache>,
    core: RwLock<Core>,
    /// Serialises "apply snapshot, then notify" so the display always ends on
    /// the snapshot that was applied last.
    display_gate: Mutex<()>,
    /// Ticket of the last cache write, taken under the display gate so
    /// writes land in the order their snapshots were applied.
    cache_tickets: AtomicU64,
    cache_written: tokio::sync::Mutex<u64>,
    background: Mutex<Background>,
    issue_seq: IssueSequence,
    correlation_ids: CorrelationIds,
    timer_registrations: AtomicUsize,
}

/// Outcome of one identity fetch.
enum Bootstrap {
    Authenticated,
    Unauthenticated,
    Failed,
}

/// Builder for [`CreditSyncClient`].
pub struct CreditSyncClientBuilder {
    config: SyncConfig,
    http: Arc<dyn HttpClient>,
    sink: Arc<dyn DisplaySink>,
    actions: Option<Arc<dyn ActionSource>>,
}

impl CreditSyncClientBuilder {
    /// Where balance updates go. Defaults to [`NullDisplaySink`].
    pub fn display_sink(mut self, sink: Arc<dyn DisplaySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Source of billable action events, attached by `initialize()`.
    pub fn action_source(mut self, actions: Arc<dyn ActionSource>) -> Self {
        self.actions = Some(actions);
        self
    }

    pub fn build(self) -> CreditSyncClient {
        let ledger = LedgerApi::new(Arc::clone(&self.http), &self.config);
        let mirror = MirrorApi::from_config(Arc::clone(&self.http), &self.config);
        let cache = self.config.cache_path.clone().map(BalanceCache::with_path);
        let correlation_ids = CorrelationIds::new(self.config.app_tag.clone());
        let (shutdown, _) = watch::channel(false);

        CreditSyncClient {
            inner: Arc::new(Inner {
                config: self.config,
                ledger,
                mirror,
                sink: self.sink,
                actions: self.actions,
                cache,
                core: RwLock::new(Core::default()),
                display_gate: Mutex::new(()),
                cache_tickets: AtomicU64::new(0),
                cache_written: tokio::sync::Mutex::new(0),
                background: Mutex::new(Background {
                    shutdown,
                    timer: None,
                    listener: None,
                }),
                issue_seq: IssueSequence::default(),
                correlation_ids,
                timer_registrations: AtomicUsize::new(0),
            }),
        }
    }
}

/// Handle to a credit-sync client. Clones share the same session.
#[derive(Clone)]
pub struct CreditSyncClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for CreditSyncClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.read_core();
        f.debug_struct("CreditSyncClient")
            .field("state", &core.state)
            .field("user_id", &core.session.as_ref().map(|s| s.user_id.as_str()))
            .field("balance", &core.session.as_ref().and_then(|s| s.balance))
            .finish()
    }
}

impl CreditSyncClient {
    pub fn new(config: SyncConfig, http: Arc<dyn HttpClient>, sink: Arc<dyn DisplaySink>) -> Self {
        Self::builder(config, http).display_sink(sink).build()
    }

    pub fn builder(config: SyncConfig, http: Arc<dyn HttpClient>) -> CreditSyncClientBuilder {
        CreditSyncClientBuilder {
            config,
            http,
            sink: Arc::new(NullDisplaySink),
            actions: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> ClientState {
        self.read_core().state
    }

    /// A copy of the cached session, if identity is known.
    pub fn session(&self) -> Option<UserSession> {
        self.read_core().session.clone()
    }

    /// Last balance reported by the ledger. `None` until one was reported.
    pub fn balance(&self) -> Option<u64> {
        self.read_core().session.as_ref().and_then(|s| s.balance)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_core()
            .session
            .as_ref()
            .is_some_and(|s| s.authenticated)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// How many times a periodic timer has been armed over the client's life.
    pub fn periodic_sync_registrations(&self) -> usize {
        self.inner.timer_registrations.load(Ordering::SeqCst)
    }

    pub fn is_periodic_sync_active(&self) -> bool {
        self.lock_background().timer.is_some()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Load identity and balance, then arm the timer and the action listener.
    ///
    /// Only the first call does anything. Never fails: an unauthenticated
    /// user disables the client, and a failed identity fetch is retried on
    /// every timer tick.
    pub async fn initialize(&self) -> InitOutcome {
        {
            let mut core = self.write_core();
            if core.state != ClientState::Uninitialized {
                tracing::debug!("initialize() called while {}, ignoring", core.state);
                return InitOutcome::AlreadyInitialized;
            }
            core.state = ClientState::Loading;
        }

        let bootstrap = self.bootstrap().await;
        if self.state().is_stopped() {
            tracing::debug!("Client stopped during initialization");
            return InitOutcome::Disabled;
        }

        match bootstrap {
            Bootstrap::Authenticated => {
                self.reconcile_balance().await;
                self.start_periodic_sync(self.inner.config.sync_interval);
                self.attach_action_listener();
                InitOutcome::Ready
            }
            Bootstrap::Unauthenticated => InitOutcome::Disabled,
            Bootstrap::Failed => {
                self.start_periodic_sync(self.inner.config.sync_interval);
                self.attach_action_listener();
                InitOutcome::Deferred
            }
        }
    }

    /// Arm the repeating refresh timer. Must run inside a tokio runtime.
    ///
    /// Returns false without arming when a timer already exists, the client
    /// is disabled, or `interval` is zero.
    pub fn start_periodic_sync(&self, interval: Duration) -> bool {
        if interval.is_zero() {
            tracing::warn!("Refusing to arm credit sync timer with a zero interval");
            return false;
        }

        let mut background = self.lock_background();
        if self.state().is_disabled() {
            tracing::debug!("Client disabled, not arming credit sync timer");
            return false;
        }
        if background.timer.is_some() {
            tracing::debug!("Credit sync timer already armed");
            return false;
        }

        let handle = tasks::spawn_periodic_sync(
            Arc::downgrade(&self.inner),
            interval,
            background.shutdown.subscribe(),
        );
        background.timer = Some(handle);
        self.inner.timer_registrations.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Disarm the timer and detach the action listener.
    ///
    /// Safe from any state, any number of times. Requests already in flight
    /// are not cancelled; they complete and apply their result.
    pub fn stop(&self) {
        let previous = {
            let mut core = self.write_core();
            std::mem::replace(&mut core.state, ClientState::Disabled(DisabledReason::Stopped))
        };
        if !previous.is_stopped() {
            tracing::info!("Credit sync stopped (was {})", previous);
        }
        self.shutdown_background();
    }

    /// Manual refresh.
    ///
    /// Retries the identity fetch while it has never succeeded, otherwise
    /// reconciles the balance.
    pub async fn refresh(&self) -> ReconcileOutcome {
        let (state, has_session) = {
            let core = self.read_core();
            (core.state, core.session.is_some())
        };

        if state.is_disabled() {
            return ReconcileOutcome::Skipped;
        }
        if has_session {
            return self.reconcile_balance().await;
        }
        if state != ClientState::Error {
            // Uninitialized, or the first identity fetch is still running.
            return ReconcileOutcome::Skipped;
        }

        tracing::debug!("Retrying credit session bootstrap");
        match self.bootstrap().await {
            Bootstrap::Authenticated => self.reconcile_balance().await,
            Bootstrap::Unauthenticated => ReconcileOutcome::Skipped,
            Bootstrap::Failed => ReconcileOutcome::Failed,
        }
    }

    // ------------------------------------------------------------------
    // Ledger operations
    // ------------------------------------------------------------------

    /// Fetch the authoritative balance and replace the cached session.
    ///
    /// Failures leave the cache and the display untouched and are only
    /// logged.
    pub async fn reconcile_balance(&self) -> ReconcileOutcome {
        let Ok((user_id, seq)) = self.begin_operation() else {
            return ReconcileOutcome::Skipped;
        };

        let outcome = match self.inner.ledger.fetch_balance(&user_id).await {
            Ok(response) if response.success => match response.balance {
                Some(balance) => {
                    self.apply_snapshot(seq, balance, response.credits_used_total)
                        .await
                }
                None => {
                    tracing::warn!("Ledger reconciliation response carried no balance");
                    ReconcileOutcome::Failed
                }
            },
            Ok(response) => {
                tracing::warn!(
                    "Ledger refused balance reconciliation: {}",
                    response.reason.as_deref().unwrap_or("no reason given")
                );
                ReconcileOutcome::Failed
            }
            Err(e) => {
                tracing::warn!(
                    error_code = e.error_code(),
                    transient = e.is_retryable(),
                    "Balance reconciliation failed: {}",
                    e
                );
                ReconcileOutcome::Failed
            }
        };

        self.end_operation(outcome != ReconcileOutcome::Failed);
        outcome
    }

    /// Deduct `amount` credits for one billable action.
    ///
    /// A fresh correlation id is generated for the action. On success the
    /// ledger's figures replace the cache, the display is updated and the
    /// summary is forwarded to the mirror without waiting for it.
    pub async fn reserve_and_settle(&self, amount: u64, description: &str) -> SyncResult<Settlement> {
        let request = ReservationRequest::new(
            amount,
            truncate_description(description),
            self.inner.correlation_ids.next(),
        );
        self.reserve_request(request).await
    }

    /// Like [`reserve_and_settle`](Self::reserve_and_settle) with a
    /// caller-supplied correlation id.
    ///
    /// The client never retries a deduction. A caller retrying one must
    /// decide whether the retry is the same logical action and pick the id
    /// accordingly.
    pub async fn reserve_request(&self, request: ReservationRequest) -> SyncResult<Settlement> {
        if request.amount == 0 {
            return Err(CreditSyncError::InvalidAmount(request.amount));
        }

        let (user_id, seq) = self.begin_operation()?;

        let deduct = DeductRequest {
            user_id: user_id.clone(),
            amount: request.amount,
            description: truncate_description(&request.description),
            action_tag: self.inner.config.action_tag.clone(),
            correlation_id: request.correlation_id.clone(),
        };
        tracing::info!(
            "Reserving {} for '{}' ({})",
            format_credits(deduct.amount),
            deduct.description,
            deduct.correlation_id
        );

        let response = match self.inner.ledger.deduct(&deduct).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    error_code = e.error_code(),
                    transient = e.is_retryable(),
                    "Deduction {} failed: {}",
                    deduct.correlation_id,
                    e
                );
                self.end_operation(false);
                return Err(CreditSyncError::Network(e));
            }
        };

        if !response.success {
            let reason = response
                .reason
                .unwrap_or_else(|| "no reason given".to_string());
            tracing::warn!("Ledger rejected deduction {}: {}", deduct.correlation_id, reason);
            self.end_operation(true);
            return Err(CreditSyncError::LedgerRejected { reason });
        }

        if let Some(balance) = response.remaining_balance {
            if self
                .apply_snapshot(seq, balance, response.total_credits_used)
                .await
                == ReconcileOutcome::Superseded
            {
                tracing::debug!("Settlement {} superseded by a newer snapshot", deduct.correlation_id);
            }
        }
        self.end_operation(true);

        let figures = match response.remaining_balance {
            Some(balance) => Some((
                balance,
                response
                    .total_credits_used
                    .unwrap_or_else(|| self.usage_total()),
            )),
            None => {
                tracing::warn!(
                    "Deduction {} confirmed without a balance, reconciling",
                    deduct.correlation_id
                );
                self.reconcile_balance().await;
                self.cached_figures()
            }
        };

        let (balance, credits_used_total) = match figures {
            Some((balance, used)) => {
                tracing::info!(
                    "Settled {}: {} left",
                    deduct.correlation_id,
                    format_credits(balance)
                );
                self.forward_to_mirror(MirrorForward {
                    user_id,
                    app_tag: self.inner.config.app_tag.clone(),
                    amount_used: deduct.amount,
                    total_used: used,
                    remaining_balance: balance,
                    timestamp: Utc::now(),
                });
                (Some(balance), used)
            }
            None => {
                tracing::warn!(
                    "Settled {} but no balance is known yet, not mirrored",
                    deduct.correlation_id
                );
                (None, self.usage_total())
            }
        };

        Ok(Settlement {
            amount: deduct.amount,
            correlation_id: deduct.correlation_id,
            balance,
            credits_used_total,
        })
    }

    /// Reserve, perform, reconcile.
    ///
    /// `action` only runs when the reservation succeeded. A failed
    /// reservation is returned as-is and nothing is performed.
    pub async fn run_billable<F, Fut, T>(
        &self,
        amount: u64,
        description: &str,
        action: F,
    ) -> SyncResult<(Settlement, T)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let settlement = self.reserve_and_settle(amount, description).await?;
        let output = action().await;
        self.reconcile_balance().await;
        Ok((settlement, output))
    }

    /// Push numbers to the display sink. Formatting is the sink's job.
    pub fn notify_display_sink(&self, balance: u64, usage_total: u64) {
        tracing::debug!("Display update: balance={} used={}", balance, usage_total);
        self.inner.sink.update(balance, usage_total);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn bootstrap(&self) -> Bootstrap {
        let seq = self.inner.issue_seq.next();

        let status = match self.inner.ledger.fetch_session_status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error_code = e.error_code(), "Failed to load credit session: {}", e);
                self.transition(ClientState::Error);
                return Bootstrap::Failed;
            }
        };

        if !status.authenticated {
            tracing::info!("No authenticated user, credit sync disabled");
            self.transition(ClientState::Disabled(DisabledReason::Unauthenticated));
            self.shutdown_background();
            let ticket = self.next_cache_ticket();
            self.write_cache(ticket, None).await;
            return Bootstrap::Unauthenticated;
        }

        let Some(user_id) = status.user_id.clone() else {
            tracing::warn!("Session endpoint reported a signed-in user without an id");
            self.transition(ClientState::Error);
            return Bootstrap::Failed;
        };

        let session = UserSession {
            user_id,
            authenticated: true,
            balance: status.balance,
            credits_used_total: status.credits_used_total.unwrap_or(0),
            credits_original: status.credits_original_or_default(),
            synced_at: Utc::now(),
        };
        match session.balance {
            Some(balance) => tracing::info!(
                "Credit session loaded for user {} ({})",
                session.user_id,
                format_credits(balance)
            ),
            None => tracing::info!(
                "Credit session loaded for user {}, balance pending",
                session.user_id
            ),
        }

        let user_id = session.user_id.clone();
        let balance_known = session.balance.is_some();
        self.install_session(seq, session).await;
        if !balance_known {
            self.show_cached_balance(&user_id).await;
        }
        Bootstrap::Authenticated
    }

    /// Store the session produced by an identity fetch.
    ///
    /// The display and the cache only hear about it when the identity
    /// endpoint reported a balance.
    async fn install_session(&self, seq: u64, session: UserSession) {
        let ticket = {
            let _gate = self.lock_display_gate();
            {
                let mut core = self.write_core();
                if !core.state.is_stopped() {
                    core.state = ClientState::Ready;
                }
                core.applied_seq = core.applied_seq.max(seq);
                core.session = Some(session.clone());
            }
            let Some(balance) = session.balance else {
                return;
            };
            self.notify_display_sink(balance, session.credits_used_total);
            self.next_cache_ticket()
        };
        self.write_cache(ticket, Some(session)).await;
    }

    /// Replace the cached session with fresh ledger figures and notify.
    ///
    /// A missing usage total carries the previous one over.
    async fn apply_snapshot(
        &self,
        seq: u64,
        balance: u64,
        credits_used_total: Option<u64>,
    ) -> ReconcileOutcome {
        let (ticket, applied) = match self.commit_snapshot(seq, balance, credits_used_total) {
            Ok(committed) => committed,
            Err(outcome) => return outcome,
        };
        let credits_used_total = applied.credits_used_total;
        self.write_cache(ticket, Some(applied)).await;

        ReconcileOutcome::Applied {
            balance,
            credits_used_total,
        }
    }

    /// Swap in the new session and notify the sink under the display gate.
    fn commit_snapshot(
        &self,
        seq: u64,
        balance: u64,
        credits_used_total: Option<u64>,
    ) -> Result<(u64, UserSession), ReconcileOutcome> {
        let _gate = self.lock_display_gate();
        let applied = {
            let mut core = self.write_core();
            if self.inner.config.ordering == SnapshotOrdering::IssueOrder
                && seq < core.applied_seq
            {
                tracing::debug!(
                    "Discarding snapshot #{} (already applied #{})",
                    seq,
                    core.applied_seq
                );
                return Err(ReconcileOutcome::Superseded);
            }
            let Some(current) = core.session.as_ref() else {
                return Err(ReconcileOutcome::Skipped);
            };
            let used = credits_used_total.unwrap_or(current.credits_used_total);
            let next = current.with_ledger_figures(balance, used);
            core.session = Some(next.clone());
            core.applied_seq = core.applied_seq.max(seq);
            next
        };

        self.notify_display_sink(balance, applied.credits_used_total);
        Ok((self.next_cache_ticket(), applied))
    }

    /// Register an operation. Hands back the user id and the issue sequence.
    fn begin_operation(&self) -> SyncResult<(String, u64)> {
        let mut core = self.write_core();
        match core.state {
            ClientState::Disabled(DisabledReason::Stopped) => return Err(CreditSyncError::Stopped),
            ClientState::Disabled(DisabledReason::Unauthenticated) => {
                return Err(CreditSyncError::Unauthenticated)
            }
            _ => {}
        }

        let user_id = match core.session.as_ref() {
            Some(session) if session.authenticated => session.user_id.clone(),
            _ => return Err(CreditSyncError::Unauthenticated),
        };

        core.in_flight += 1;
        if matches!(core.state, ClientState::Ready | ClientState::Error) {
            core.state = ClientState::Syncing;
        }
        Ok((user_id, self.inner.issue_seq.next()))
    }

    /// Complete an operation. The state settles once nothing is in flight.
    fn end_operation(&self, succeeded: bool) {
        let mut core = self.write_core();
        core.in_flight = core.in_flight.saturating_sub(1);
        if core.in_flight == 0 && core.state == ClientState::Syncing {
            core.state = if succeeded {
                ClientState::Ready
            } else {
                ClientState::Error
            };
        }
    }

    /// Change state unless the client was stopped.
    fn transition(&self, to: ClientState) {
        let mut core = self.write_core();
        if core.state.is_stopped() {
            return;
        }
        if core.state != to {
            tracing::debug!("Credit sync state {} -> {}", core.state, to);
        }
        core.state = to;
    }

    /// Balance and usage, once a balance has been reported.
    fn cached_figures(&self) -> Option<(u64, u64)> {
        let core = self.read_core();
        let session = core.session.as_ref()?;
        session.balance.map(|balance| (balance, session.credits_used_total))
    }

    fn usage_total(&self) -> u64 {
        self.read_core()
            .session
            .as_ref()
            .map_or(0, |s| s.credits_used_total)
    }

    fn attach_action_listener(&self) -> bool {
        let Some(source) = self.inner.actions.as_ref() else {
            return false;
        };

        let mut background = self.lock_background();
        if self.state().is_disabled() || background.listener.is_some() {
            return false;
        }

        let handle = tasks::spawn_action_listener(
            Arc::downgrade(&self.inner),
            source.subscribe(),
            background.shutdown.subscribe(),
        );
        background.listener = Some(handle);
        true
    }

    fn shutdown_background(&self) {
        let mut background = self.lock_background();
        background.shutdown.send_replace(true);
        if let Some(timer) = background.timer.take() {
            timer.abort();
        }
        // The listener finishes the action it is settling, then exits.
        background.listener.take();
    }

    fn forward_to_mirror(&self, summary: MirrorForward) {
        let Some(mirror) = self.inner.mirror.clone() else {
            return;
        };

        tokio::spawn(async move {
            match mirror.forward(&summary).await {
                Ok(()) => tracing::debug!(
                    "Mirrored transaction for user {} to {}",
                    summary.user_id,
                    mirror.url()
                ),
                Err(e) => {
                    let err = CreditSyncError::MirrorForwardFailed(e);
                    tracing::warn!(error_code = err.error_code(), "{}", err);
                }
            }
        });
    }

    /// Warm start: show the balance a previous run saved for `user_id` while
    /// the first reconciliation is still outstanding.
    ///
    /// A record saved for anyone else is ignored. The record is display-only
    /// and never becomes the session.
    async fn show_cached_balance(&self, user_id: &str) {
        let Some(cache) = self.inner.cache.clone() else {
            return;
        };
        let cached = match tokio::task::spawn_blocking(move || cache.load()).await {
            Ok(Some(cached)) => cached,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Balance cache read task failed: {}", e);
                return;
            }
        };
        if cached.user_id != user_id {
            tracing::debug!("Ignoring balance cache saved for another user");
            return;
        }
        let Some(balance) = cached.balance else {
            return;
        };

        let _gate = self.lock_display_gate();
        let still_pending = self
            .read_core()
            .session
            .as_ref()
            .is_some_and(|s| s.user_id == user_id && s.balance.is_none());
        if still_pending {
            tracing::debug!(
                "Showing cached balance for user {} from {}",
                cached.user_id,
                cached.synced_at
            );
            self.notify_display_sink(balance, cached.credits_used_total);
        }
    }

    /// Taken under the display gate.
    fn next_cache_ticket(&self) -> u64 {
        self.inner.cache_tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Save `session` to the cache, or clear it for `None`, off the async
    /// workers. A write older than one already on disk is dropped.
    async fn write_cache(&self, ticket: u64, session: Option<UserSession>) {
        let Some(cache) = self.inner.cache.clone() else {
            return;
        };

        let mut written = self.inner.cache_written.lock().await;
        if ticket <= *written {
            return;
        }
        *written = ticket;

        let path = cache.path().to_path_buf();
        let result = tokio::task::spawn_blocking(move || match session {
            Some(session) => cache.save(&session),
            None => cache.clear(),
        })
        .await;
        match result {
            Ok(true) => {}
            Ok(false) => tracing::warn!("Failed to update balance cache {:?}", path),
            Err(e) => tracing::warn!("Balance cache write task failed: {}", e),
        }
    }

    fn read_core(&self) -> RwLockReadGuard<'_, Core> {
        self.inner.core.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_core(&self) -> RwLockWriteGuard<'_, Core> {
        self.inner.core.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_background(&self) -> MutexGuard<'_, Background> {
        self.inner
            .background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_display_gate(&self) -> MutexGuard<'_, ()> {
        self.inner
            .display_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
