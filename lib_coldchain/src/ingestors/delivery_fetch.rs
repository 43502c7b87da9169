//! # Delivery Loaders
//!
//! On-demand loads for the deliveries profile. Unlike the poller, a failure here
//! is shown to the user through `SetError`; the previous data is not silently
//! kept as if nothing happened.

use std::sync::Arc;

use crate::core::{Action, AppStore};
use crate::domain::{Category, TelemetryReading};
use crate::errors::MonitorError;
use crate::ingestors::telemetry_polling::LoadingFlag;
use crate::retrieve::ky_http::{describe_failure, path_with_segment, ApiClient};

pub const NO_DATA_MESSAGE: &str = "No data found for this delivery";
pub const DETAIL_ERROR_MESSAGE: &str = "Error fetching delivery details";
pub const LIST_ERROR_MESSAGE: &str = "Error fetching active deliveries";

const HISTORY_PREFIX: &str = "/api/telemetry/history";

/// History endpoint for one delivery, the id percent-encoded as one segment.
pub fn history_endpoint(delivery_id: &str) -> Result<String, MonitorError> {
    path_with_segment(HISTORY_PREFIX, delivery_id)
}

#[derive(Clone)]
pub struct DeliveryLoader {
    client: Arc<ApiClient>,
    store: AppStore,
}

impl DeliveryLoader {
    pub fn new(client: Arc<ApiClient>, store: AppStore) -> Self {
        Self { client, store }
    }

    /// Replaces the active delivery list. Returns the number of deliveries.
    pub async fn load_active(&self) -> Result<usize, MonitorError> {
        let _loading = LoadingFlag::raise(&self.store);
        let path = Category::ActiveDeliveries.endpoint();

        match self.client.get_json::<Vec<TelemetryReading>>(path).await {
            Ok(deliveries) => {
                let count = deliveries.len();
                self.store.dispatch(Action::SetActiveDeliveries(deliveries));
                self.store.dispatch(Action::ClearError);
                Ok(count)
            }
            Err(err) => {
                tracing::error!("{}", describe_failure(path, &err));
                self.store.dispatch(Action::SetError(LIST_ERROR_MESSAGE.to_string()));
                Err(err)
            }
        }
    }

    /// Loads one delivery's history and selects its most recent reading.
    ///
    /// An empty history is not an error for the caller (`Ok(None)`), but the
    /// user sees "No data found for this delivery". On failure the previous
    /// selection is dropped so only the error is shown.
    pub async fn load_detail(&self, delivery_id: &str) -> Result<Option<TelemetryReading>, MonitorError> {
        let _loading = LoadingFlag::raise(&self.store);
        let path = history_endpoint(delivery_id)?;

        let history = match self.client.get_json::<Vec<TelemetryReading>>(&path).await {
            Ok(history) => history,
            Err(err) => {
                tracing::error!(delivery = delivery_id, "{}", describe_failure(&path, &err));
                self.store.dispatch(Action::SetSelectedDelivery(None));
                self.store.dispatch(Action::SetDeliveryHistory(Vec::new()));
                self.store.dispatch(Action::SetError(DETAIL_ERROR_MESSAGE.to_string()));
                return Err(err);
            }
        };

        let latest = history
            .iter()
            .fold(None::<&TelemetryReading>, |best, r| match best {
                Some(b) if !r.is_newer_than(b) => Some(b),
                _ => Some(r),
            })
            .cloned();

        match latest {
            Some(latest) => {
                tracing::debug!(delivery = delivery_id, points = history.len(), "delivery history loaded");
                self.store.dispatch(Action::SetDeliveryHistory(history));
                self.store.dispatch(Action::SetSelectedDelivery(Some(latest.clone())));
                self.store.dispatch(Action::ClearError);
                Ok(Some(latest))
            }
            None => {
                self.store.dispatch(Action::SetDeliveryHistory(Vec::new()));
                self.store.dispatch(Action::SetSelectedDelivery(None));
                self.store.dispatch(Action::SetError(NO_DATA_MESSAGE.to_string()));
                Ok(None)
            }
        }
    }

    /// Deselects the current delivery.
    pub fn clear_selection(&self) {
        self.store.dispatch(Action::SetSelectedDelivery(None));
        self.store.dispatch(Action::SetDeliveryHistory(Vec::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::test_support::{json_response, request_path, MockServer};
    use crate::retrieve::ClientOptions;

    fn backend(request: &str) -> String {
        match request_path(request) {
            "/api/deliveries/active" => json_response(
                200,
                r#"[{"part_id":"X1","temp":5.0},{"part_id":"X2","temp":9.5}]"#,
            ),
            "/api/telemetry/history/X1" => json_response(
                200,
                r#"[
                    {"part_id":"X1","temp":5.0,"ts":"2024-05-01T10:00:00Z"},
                    {"part_id":"X1","temp":6.5,"ts":"2024-05-01T10:05:00Z"},
                    {"part_id":"X1","temp":5.5,"ts":"2024-05-01T09:55:00Z"}
                ]"#,
            ),
            "/api/telemetry/history/EMPTY" => json_response(200, "[]"),
            "/api/telemetry/history/A%2FB%201" => json_response(200, r#"[{"part_id":"A/B 1","temp":3.0}]"#),
            _ => json_response(500, r#"{"detail":"db down"}"#),
        }
    }

    async fn loader(server: &MockServer, store: &AppStore) -> DeliveryLoader {
        let client = ApiClient::new(&server.base_url(), ClientOptions::default()).unwrap();
        DeliveryLoader::new(Arc::new(client), store.clone())
    }

    #[tokio::test]
    async fn detail_selects_most_recent_point() {
        let server = MockServer::start(backend).await;
        let store = AppStore::default();
        let loader = loader(&server, &store).await;

        let latest = loader.load_detail("X1").await.unwrap().unwrap();

        assert_eq!(latest.temperature, 6.5);
        let state = store.snapshot();
        assert_eq!(state.delivery_history.len(), 3);
        assert_eq!(state.selected_delivery.unwrap().temperature, 6.5);
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn empty_history_reports_no_data() {
        let server = MockServer::start(backend).await;
        let store = AppStore::default();
        let loader = loader(&server, &store).await;

        assert!(loader.load_detail("EMPTY").await.unwrap().is_none());

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some(NO_DATA_MESSAGE));
        assert!(state.selected_delivery.is_none());
    }

    #[tokio::test]
    async fn failed_detail_surfaces_error() {
        let server = MockServer::start(backend).await;
        let store = AppStore::default();
        let loader = loader(&server, &store).await;
        loader.load_detail("X1").await.unwrap();

        let err = loader.load_detail("BROKEN").await.unwrap_err();

        assert!(matches!(err, MonitorError::HttpStatus { status: 500, .. }));
        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some(DETAIL_ERROR_MESSAGE));
        assert!(state.selected_delivery.is_none());
        assert!(state.delivery_history.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn detail_ids_are_sent_as_one_segment() {
        let server = MockServer::start(backend).await;
        let store = AppStore::default();
        let loader = loader(&server, &store).await;

        let latest = loader.load_detail("A/B 1").await.unwrap().unwrap();

        assert_eq!(latest.package_id, "A/B 1");
        assert_eq!(server.hits("/api/telemetry/history/A%2FB%201"), 1);
    }

    #[tokio::test]
    async fn active_list_replaces_and_clears_error() {
        let server = MockServer::start(backend).await;
        let store = AppStore::default();
        store.dispatch(Action::SetError("stale".into()));
        let loader = loader(&server, &store).await;

        assert_eq!(loader.load_active().await.unwrap(), 2);

        let state = store.snapshot();
        assert_eq!(state.active_deliveries.len(), 2);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn failed_active_list_sets_error() {
        let server = MockServer::start(|_| json_response(502, "{}")).await;
        let store = AppStore::default();
        let loader = loader(&server, &store).await;

        assert!(loader.load_active().await.is_err());
        assert_eq!(store.read(|s| s.error.clone()).as_deref(), Some(LIST_ERROR_MESSAGE));
    }
}
