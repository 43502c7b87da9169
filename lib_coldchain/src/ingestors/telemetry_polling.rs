//! # Telemetry Polling Ingestor
//!
//! Refreshes every data category of a profile on a fixed cadence and on demand.
//!
//! ## Cycle:
//! 1.  `SetLoading(true)`.
//! 2.  All category fetches run concurrently and are joined.
//! 3.  Each successful category dispatches its setter. A failed category
//!     dispatches nothing, so the store keeps its previous value.
//! 4.  `MarkUpdated` if anything succeeded, a warning if everything failed.
//! 5.  `SetLoading(false)`, also when the cycle is cancelled half way.
//!
//! `run` refreshes immediately, then on every tick of the interval or whenever
//! `refresh_now` is called, until the cancellation token fires. Ticks missed
//! while a cycle is still in flight are delayed rather than bunched up.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::{Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core::{Action, AppStore};
use crate::domain::{
    Alert, Category, KpiSnapshot, LocationPoint, SeriesPoint, TelemetryReading,
};
use crate::retrieve::ApiClient;

/// Default cadence between refresh cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub succeeded: Vec<Category>,
    pub failed: Vec<Category>,
}

impl RefreshReport {
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

pub struct TelemetryPoller {
    client: Arc<ApiClient>,
    store: AppStore,
    categories: Vec<Category>,
    interval: Duration,
    trigger: Notify,
    cycle: Mutex<()>,
}

impl TelemetryPoller {
    pub fn new(
        client: Arc<ApiClient>,
        store: AppStore,
        categories: Vec<Category>,
        interval: Duration,
    ) -> Self {
        let (categories, skipped): (Vec<_>, Vec<_>) =
            categories.into_iter().partition(|c| c.is_pollable());
        for category in skipped {
            tracing::warn!(%category, "category is loaded on demand, not polled");
        }
        Self {
            client,
            store,
            categories,
            interval,
            trigger: Notify::new(),
            cycle: Mutex::new(()),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Asks a running `run` loop for an immediate cycle. Several calls before
    /// the loop wakes collapse into one.
    pub fn refresh_now(&self) {
        self.trigger.notify_one();
    }

    /// Runs one full cycle. Concurrent callers wait for each other.
    pub async fn refresh(&self) -> RefreshReport {
        let _cycle = self.cycle.lock().await;
        let _loading = LoadingFlag::raise(&self.store);

        let results = join_all(
            self.categories
                .iter()
                .map(|&category| async move { (category, self.fetch(category).await) }),
        )
        .await;

        let mut report = RefreshReport::default();
        for (category, action) in results {
            match action {
                Some(action) => {
                    self.store.dispatch(action);
                    report.succeeded.push(category);
                }
                None => report.failed.push(category),
            }
        }

        if !report.succeeded.is_empty() {
            self.store.dispatch(Action::MarkUpdated(Utc::now()));
        } else if report.all_failed() {
            tracing::warn!(
                categories = report.failed.len(),
                "refresh cycle failed for every category, keeping previous data"
            );
        }
        report
    }

    /// Main loop. Returns when `cancel` fires; an in-flight cycle is dropped.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            categories = self.categories.len(),
            "telemetry poller started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                _ = self.trigger.notified() => {
                    tracing::debug!("manual refresh requested");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                report = self.refresh() => {
                    tracing::debug!(
                        ok = report.succeeded.len(),
                        failed = report.failed.len(),
                        "refresh cycle finished"
                    );
                }
            }
        }
        tracing::info!("telemetry poller stopped");
    }

    async fn fetch(&self, category: Category) -> Option<Action> {
        let path = category.endpoint();
        let client = &self.client;
        match category {
            Category::Telemetry => client
                .fetch_category::<Vec<TelemetryReading>>(path)
                .await
                .map(Action::SetTelemetry),
            Category::LatestTelemetry => client
                .fetch_category::<Vec<TelemetryReading>>(path)
                .await
                .map(|readings| {
                    Action::SetTelemetry(
                        readings
                            .into_iter()
                            .map(TelemetryReading::with_default_position)
                            .collect(),
                    )
                }),
            Category::Kpis => client
                .fetch_category::<KpiSnapshot>(path)
                .await
                .map(Action::SetKpis),
            Category::Alerts | Category::ActiveAlerts => client
                .fetch_category::<Vec<Alert>>(path)
                .await
                .map(Action::SetAlerts),
            Category::Locations => client
                .fetch_category::<Vec<LocationPoint>>(path)
                .await
                .map(Action::SetLocations),
            Category::Temperature => client
                .fetch_category::<Vec<SeriesPoint>>(path)
                .await
                .map(Action::SetTemperatureSeries),
            Category::GForce => client
                .fetch_category::<Vec<SeriesPoint>>(path)
                .await
                .map(Action::SetGForceSeries),
            // DeliveryLoader owns the list
            Category::ActiveDeliveries => None,
        }
    }
}

/// Sets `loading` on creation and clears it on drop.
pub(crate) struct LoadingFlag<'a> {
    store: &'a AppStore,
}

impl<'a> LoadingFlag<'a> {
    pub(crate) fn raise(store: &'a AppStore) -> Self {
        store.dispatch(Action::SetLoading(true));
        Self { store }
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.store.dispatch(Action::SetLoading(false));
    }
}
