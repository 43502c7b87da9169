//! # Action Dispatcher
//!
//! Producers that live in their own tasks (the real-time channel) do not touch
//! the store directly. They push typed `Action`s into an unbounded queue and the
//! `Dispatcher` applies them to the store one at a time, in arrival order.
//!
//! The dispatcher stops once every `ActionSender` has been dropped and the queue
//! is drained.

use tokio::sync::mpsc;

use super::reducer::Action;
use super::store::AppStore;

/// Sending half handed to producers.
pub type ActionSender = mpsc::UnboundedSender<Action>;

pub struct Dispatcher {
    store: AppStore,
    rx: mpsc::UnboundedReceiver<Action>,
}

impl Dispatcher {
    /// Creates the dispatcher and the sender producers should clone.
    pub fn new(store: AppStore) -> (Self, ActionSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { store, rx }, tx)
    }

    /// Applies queued actions until all senders are gone. Returns how many
    /// actions were applied.
    pub async fn run(mut self) -> usize {
        let mut applied = 0usize;
        while let Some(action) = self.rx.recv().await {
            self.store.dispatch(action);
            applied += 1;
        }
        tracing::debug!(applied, "action queue closed");
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Alert, TelemetryReading};

    #[tokio::test]
    async fn applies_actions_in_order_until_closed() {
        let store = AppStore::default();
        let (dispatcher, tx) = Dispatcher::new(store.clone());
        let handle = tokio::spawn(dispatcher.run());

        tx.send(Action::AddDeliveryTelemetry(TelemetryReading::new("A", 1.0))).unwrap();
        tx.send(Action::AddDeliveryTelemetry(TelemetryReading::new("A", 2.0))).unwrap();
        tx.send(Action::AddAlert(Alert::new("temp_high"))).unwrap();
        drop(tx);

        assert_eq!(handle.await.unwrap(), 3);
        let state = store.snapshot();
        assert_eq!(state.active_deliveries.len(), 1);
        assert_eq!(state.active_deliveries[0].temperature, 2.0);
        assert_eq!(state.alerts.len(), 1);
    }
}
