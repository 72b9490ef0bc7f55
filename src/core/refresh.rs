//! Periodic and manual refresh of the dashboard state.
//!
//! The auto refresh timer fires every interval regardless of cooldown. A
//! manual refresh is only honored once the cooldown that follows every
//! completed refresh has elapsed. Either way at most one refresh is in flight.

use crate::core::market::MarketDataProvider;
use crate::core::state::Store;
use chrono::Local;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(20_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New data was installed.
    Applied,
    /// The fetch failed; previous data is kept.
    Failed,
    /// Another refresh was in flight, or the cooldown had not elapsed.
    Skipped,
    /// The result arrived after the poller was stopped.
    Discarded,
}

/// Owner of a background polling task. Stopping (or dropping) it cancels the
/// timer; jobs already started run to completion.
pub struct PollHandle {
    task: JoinHandle<()>,
    closed: Arc<AtomicBool>,
}

impl PollHandle {
    pub fn stop(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Stopping poller");
        }
        self.task.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs `job` immediately and then every `period`. Each job is spawned on its
/// own task so aborting the timer never cancels a fetch half way.
pub fn spawn_poller<F, Fut>(period: Duration, closed: Arc<AtomicBool>, mut job: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tokio::spawn(job());
        }
    });
    PollHandle { task, closed }
}

/// Clears the in-flight flag however the refresh future ends.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RefreshController {
    provider: Arc<dyn MarketDataProvider>,
    store: Store,
    interval: Duration,
    refreshing: Arc<AtomicBool>,
    cooldown_until: Mutex<Option<Instant>>,
    closed: Arc<AtomicBool>,
}

impl RefreshController {
    pub fn new(provider: Arc<dyn MarketDataProvider>, store: Store, interval: Duration) -> Self {
        Self {
            provider,
            store,
            interval,
            refreshing: Arc::new(AtomicBool::new(false)),
            cooldown_until: Mutex::new(None),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// True once the cooldown after the last completed refresh has elapsed.
    pub fn can_refresh(&self) -> bool {
        self.cooldown_deadline()
            .is_none_or(|deadline| Instant::now() >= deadline)
    }

    /// Time left before a manual refresh is accepted again.
    pub fn cooldown_remaining(&self) -> Duration {
        self.cooldown_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }

    fn cooldown_deadline(&self) -> Option<Instant> {
        *self
            .cooldown_until
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_cooldown(&self) {
        let mut deadline = self
            .cooldown_until
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *deadline = Some(Instant::now() + self.interval);
    }

    /// Fetches all collections and installs them. Failures are logged and
    /// recorded on the state, never returned.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(in_flight) = InFlight::acquire(&self.refreshing) else {
            debug!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };
        self.run(in_flight).await
    }

    async fn run(&self, _in_flight: InFlight) -> RefreshOutcome {
        let result = self.provider.fetch_all().await;

        let outcome = if self.closed.load(Ordering::Acquire) {
            debug!("Poller stopped, discarding refresh result");
            RefreshOutcome::Discarded
        } else {
            match result {
                Ok(snapshot) => {
                    info!(
                        stocks = snapshot.stocks.len(),
                        bonds = snapshot.bonds.len(),
                        notes = snapshot.notes.len(),
                        mep = snapshot.mep.len(),
                        "Market data refreshed"
                    );
                    self.store
                        .update(|state| state.apply_snapshot(snapshot, Local::now()));
                    RefreshOutcome::Applied
                }
                Err(e) => {
                    error!(error = %e, "Error fetching market data");
                    let message = format!("{e:#}");
                    self.store.update(|state| state.last_error = Some(message));
                    RefreshOutcome::Failed
                }
            }
        };

        self.start_cooldown();
        outcome
    }

    /// User-triggered refresh; a no-op while cooling down or in flight.
    pub async fn manual_refresh(&self) -> RefreshOutcome {
        if !self.can_refresh() || self.is_refreshing() {
            self.log_ignored_manual();
            return RefreshOutcome::Skipped;
        }
        self.refresh().await
    }

    /// Starts a manual refresh on its own task and returns without waiting
    /// for it. The in-flight flag is already set when this returns true.
    pub fn trigger_manual(self: &Arc<Self>) -> bool {
        if !self.can_refresh() {
            self.log_ignored_manual();
            return false;
        }
        let Some(in_flight) = InFlight::acquire(&self.refreshing) else {
            self.log_ignored_manual();
            return false;
        };

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.run(in_flight).await;
        });
        true
    }

    fn log_ignored_manual(&self) {
        debug!(
            remaining_ms = self.cooldown_remaining().as_millis() as u64,
            refreshing = self.is_refreshing(),
            "Manual refresh ignored"
        );
    }

    /// Starts the auto refresh timer. The first refresh runs right away.
    pub fn spawn(self: &Arc<Self>) -> PollHandle {
        let controller = Arc::clone(self);
        spawn_poller(self.interval, Arc::clone(&self.closed), move || {
            let controller = Arc::clone(&controller);
            async move {
                controller.refresh().await;
            }
        })
    }
}
