//! # Application Store
//!
//! An explicit, cloneable handle to the shared `DashboardState`. It is built once
//! in `main` and handed to the poller, the dispatcher and the renderer; nothing
//! looks state up globally.
//!
//! Internally the state lives in a `tokio::sync::watch` channel: `dispatch` runs
//! the reducer under the channel's lock (so concurrent writers are serialised),
//! and every `subscribe`d receiver observes the change.

use std::sync::Arc;
use tokio::sync::watch;

use super::reducer::{Action, DashboardState};

#[derive(Clone)]
pub struct AppStore {
    inner: Arc<watch::Sender<DashboardState>>,
}

impl AppStore {
    pub fn new(initial: DashboardState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { inner: Arc::new(tx) }
    }

    /// Runs `action` through the reducer and notifies subscribers.
    pub fn dispatch(&self, action: Action) {
        tracing::trace!(action = action.kind(), "dispatch");
        self.inner.send_modify(|state| state.apply(action));
    }

    /// A clone of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.inner.borrow().clone()
    }

    /// Reads the current state without cloning it. Keep `f` short: writers wait
    /// while it runs.
    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// A receiver that wakes after every dispatched action.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.subscribe()
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(DashboardState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TelemetryReading;

    #[test]
    fn clones_share_state() {
        let store = AppStore::default();
        let other = store.clone();
        other.dispatch(Action::SetLoading(true));
        assert!(store.read(|s| s.loading));
    }

    #[tokio::test]
    async fn subscribers_see_dispatches() {
        let store = AppStore::default();
        let mut rx = store.subscribe();

        store.dispatch(Action::AddDeliveryTelemetry(TelemetryReading::new("A", 3.0)));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().active_deliveries.len(), 1);
    }
}
