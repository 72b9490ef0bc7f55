//! Shared dashboard state with change notification.

use crate::core::instrument::MarketSnapshot;
use crate::core::selection::{COMPARISON_CAPACITY, Selection};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub snapshot: MarketSnapshot,
    pub favorites: Selection,
    pub comparison: Selection,
    pub last_update: Option<DateTime<Local>>,
    /// Message of the most recent failed refresh, cleared on success.
    pub last_error: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            snapshot: MarketSnapshot::default(),
            favorites: Selection::new(),
            comparison: Selection::with_capacity(COMPARISON_CAPACITY),
            last_update: None,
            last_error: None,
        }
    }
}

impl DashboardState {
    /// Installs a fresh snapshot and reconciles both selections against it.
    pub fn apply_snapshot(&mut self, snapshot: MarketSnapshot, at: DateTime<Local>) {
        self.favorites.reconcile(&snapshot);
        self.comparison.reconcile(&snapshot);
        self.snapshot = snapshot;
        self.last_update = Some(at);
        self.last_error = None;
    }
}

/// Cloneable handle to the dashboard state. Every update notifies subscribers.
#[derive(Clone)]
pub struct Store {
    inner: Arc<watch::Sender<DashboardState>>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(DashboardState::default())
    }

    pub fn with_state(state: DashboardState) -> Self {
        let (tx, _) = watch::channel(state);
        Self { inner: Arc::new(tx) }
    }

    /// Runs `f` against the current state without holding it across awaits.
    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Mutates the state atomically and wakes subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let mut result = None;
        self.inner.send_modify(|state| result = Some(f(state)));
        debug!("State UPDATE");
        // send_modify always runs the closure
        result.unwrap_or_else(|| unreachable!("send_modify skipped the update closure"))
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instrument::tests::{equity, mep};

    #[test]
    fn test_apply_snapshot_reconciles_and_clears_error() {
        let mut state = DashboardState::default();
        state.favorites.toggle(equity("GGAL", 1.0, 2.0).into());
        state.comparison.toggle(mep("AL30", 1.0, 2.0).into());
        state.last_error = Some("HTTP error".to_string());

        let snapshot = MarketSnapshot {
            stocks: vec![equity("GGAL", 5.0, 6.0)],
            mep: vec![mep("AL30", 7.0, 8.0)],
            ..Default::default()
        };
        let now = Local::now();
        state.apply_snapshot(snapshot.clone(), now);

        assert_eq!(state.snapshot, snapshot);
        assert_eq!(state.favorites.get("GGAL").unwrap().bid(), Some(5.0));
        assert_eq!(state.comparison.get("AL30").unwrap().ask(), Some(8.0));
        assert_eq!(state.last_update, Some(now));
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn test_update_notifies_subscribers() {
        let store = Store::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let added = store.update(|s| s.favorites.toggle(equity("YPFD", 1.0, 2.0).into()));
        assert_eq!(added, crate::core::selection::Toggle::Added);

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().favorites.contains("YPFD"));
        assert!(store.read(|s| s.favorites.contains("YPFD")));
    }

    #[test]
    fn test_clones_share_state() {
        let store = Store::new();
        let other = store.clone();

        other.update(|s| s.last_error = Some("boom".to_string()));
        assert_eq!(store.read(|s| s.last_error.clone()), Some("boom".to_string()));
        assert_eq!(store.read(|s| s.comparison.len()), 0);
    }
}
