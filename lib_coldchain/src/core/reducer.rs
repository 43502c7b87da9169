//! # Dashboard Reducer
//!
//! `DashboardState` holds the latest known snapshot of every data category plus
//! the UI flags (loading, error, connection). `DashboardState::apply` is the
//! single transition function: given an `Action` it rewrites the state in place
//! and touches nothing else.
//!
//! ## Rules:
//! - Category setters replace their slot wholesale. A failed fetch produces no
//!   action at all, which is what keeps previously held data (last-known-good).
//! - `SetAlerts` is the one exception: alerts pushed through `AddAlert` are kept
//!   in `live_alerts` and stay in front of every polled list, unless the polled
//!   list already carries the same alert id.
//! - `AddDeliveryTelemetry` upserts by package id: an existing entry is replaced
//!   in place, a new identity is appended. Dispatching the same reading twice is
//!   therefore a no-op the second time.
//! - `AddAlert` prepends, so the newest alert is always first.
//! - Series setters keep points oldest→newest, trimmed to `history_window`.

use chrono::{DateTime, Utc};

use crate::domain::series::into_window;
use crate::domain::{Alert, KpiSnapshot, LocationPoint, SeriesPoint, TelemetryReading};

/// Number of series points retained per chart category.
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Pushed alerts remembered across polls, newest first.
pub const LIVE_ALERT_LIMIT: usize = 100;

/// Every state transition the monitor knows about.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetTelemetry(Vec<TelemetryReading>),
    SetKpis(KpiSnapshot),
    SetAlerts(Vec<Alert>),
    SetLocations(Vec<LocationPoint>),
    SetTemperatureSeries(Vec<SeriesPoint>),
    SetGForceSeries(Vec<SeriesPoint>),
    SetActiveDeliveries(Vec<TelemetryReading>),
    /// Upsert by package id.
    AddDeliveryTelemetry(TelemetryReading),
    /// Prepend.
    AddAlert(Alert),
    SetDeliveryHistory(Vec<TelemetryReading>),
    SetSelectedDelivery(Option<TelemetryReading>),
    SetLoading(bool),
    SetError(String),
    ClearError,
    SetConnected(bool),
    /// Records the completion time of a refresh cycle with at least one success.
    MarkUpdated(DateTime<Utc>),
}

impl Action {
    /// Short name used in trace logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetTelemetry(_) => "SET_TELEMETRY",
            Action::SetKpis(_) => "SET_KPIS",
            Action::SetAlerts(_) => "SET_ALERTS",
            Action::SetLocations(_) => "SET_LOCATIONS",
            Action::SetTemperatureSeries(_) => "SET_TEMPERATURE_SERIES",
            Action::SetGForceSeries(_) => "SET_GFORCE_SERIES",
            Action::SetActiveDeliveries(_) => "SET_ACTIVE_DELIVERIES",
            Action::AddDeliveryTelemetry(_) => "ADD_DELIVERY_TELEMETRY",
            Action::AddAlert(_) => "ADD_ALERT",
            Action::SetDeliveryHistory(_) => "SET_DELIVERY_HISTORY",
            Action::SetSelectedDelivery(_) => "SET_SELECTED_DELIVERY",
            Action::SetLoading(_) => "SET_LOADING",
            Action::SetError(_) => "SET_ERROR",
            Action::ClearError => "CLEAR_ERROR",
            Action::SetConnected(_) => "SET_CONNECTED",
            Action::MarkUpdated(_) => "MARK_UPDATED",
        }
    }
}

/// The latest known snapshot of everything the dashboards display.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub telemetry: Vec<TelemetryReading>,
    pub kpis: KpiSnapshot,
    /// What the alert panel shows: pushed alerts first, then the last polled list.
    pub alerts: Vec<Alert>,
    /// Alerts received on the real-time channel.
    pub live_alerts: Vec<Alert>,
    pub locations: Vec<LocationPoint>,
    pub temperature_series: Vec<SeriesPoint>,
    pub gforce_series: Vec<SeriesPoint>,
    pub active_deliveries: Vec<TelemetryReading>,
    pub delivery_history: Vec<TelemetryReading>,
    pub selected_delivery: Option<TelemetryReading>,
    pub loading: bool,
    pub error: Option<String>,
    pub connected: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub history_window: usize,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl DashboardState {
    pub fn new(history_window: usize) -> Self {
        Self {
            telemetry: Vec::new(),
            kpis: KpiSnapshot::default(),
            alerts: Vec::new(),
            live_alerts: Vec::new(),
            locations: Vec::new(),
            temperature_series: Vec::new(),
            gforce_series: Vec::new(),
            active_deliveries: Vec::new(),
            delivery_history: Vec::new(),
            selected_delivery: None,
            loading: false,
            error: None,
            connected: false,
            last_update: None,
            history_window: history_window.max(1),
        }
    }

    /// Applies one action.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetTelemetry(readings) => self.telemetry = readings,
            Action::SetKpis(kpis) => self.kpis = kpis,
            Action::SetAlerts(polled) => self.merge_polled_alerts(polled),
            Action::SetLocations(locations) => self.locations = locations,
            Action::SetTemperatureSeries(points) => {
                self.temperature_series = into_window(points, self.history_window);
            }
            Action::SetGForceSeries(points) => {
                self.gforce_series = into_window(points, self.history_window);
            }
            Action::SetActiveDeliveries(deliveries) => self.active_deliveries = deliveries,
            Action::AddDeliveryTelemetry(reading) => self.upsert_delivery(reading),
            Action::AddAlert(alert) => {
                self.live_alerts.insert(0, alert.clone());
                self.live_alerts.truncate(LIVE_ALERT_LIMIT);
                self.alerts.insert(0, alert);
            }
            Action::SetDeliveryHistory(history) => self.delivery_history = history,
            Action::SetSelectedDelivery(selected) => self.selected_delivery = selected,
            Action::SetLoading(loading) => self.loading = loading,
            Action::SetError(message) => self.error = Some(message),
            Action::ClearError => self.error = None,
            Action::SetConnected(connected) => self.connected = connected,
            Action::MarkUpdated(at) => self.last_update = Some(at),
        }
    }

    /// Consuming form of [`apply`](Self::apply).
    pub fn reduce(mut self, action: Action) -> Self {
        self.apply(action);
        self
    }

    fn merge_polled_alerts(&mut self, polled: Vec<Alert>) {
        let mut merged: Vec<Alert> = self
            .live_alerts
            .iter()
            .filter(|live| match &live.id {
                Some(id) => !polled.iter().any(|p| p.id.as_ref() == Some(id)),
                None => true,
            })
            .cloned()
            .collect();
        merged.extend(polled);
        self.alerts = merged;
    }

    fn upsert_delivery(&mut self, reading: TelemetryReading) {
        match self
            .active_deliveries
            .iter_mut()
            .find(|d| d.package_id == reading.package_id)
        {
            Some(existing) => *existing = reading,
            None => self.active_deliveries.push(reading),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityId;

    fn reading(id: &str, temp: f64) -> TelemetryReading {
        TelemetryReading::new(id, temp)
    }

    #[test]
    fn upsert_appends_new_identity() {
        let state = DashboardState::default()
            .reduce(Action::AddDeliveryTelemetry(reading("A", 4.0)))
            .reduce(Action::AddDeliveryTelemetry(reading("X1", 5.0)));
        assert_eq!(state.active_deliveries.len(), 2);
        assert_eq!(state.active_deliveries[1].package_id, "X1");
    }

    #[test]
    fn upsert_replaces_in_place() {
        let state = DashboardState::default()
            .reduce(Action::SetActiveDeliveries(vec![reading("A", 4.0), reading("B", 5.0)]))
            .reduce(Action::AddDeliveryTelemetry(reading("A", 9.5)));
        assert_eq!(state.active_deliveries.len(), 2);
        assert_eq!(state.active_deliveries[0].package_id, "A");
        assert_eq!(state.active_deliveries[0].temperature, 9.5);
    }

    #[test]
    fn upsert_is_idempotent() {
        let once = DashboardState::default().reduce(Action::AddDeliveryTelemetry(reading("A", 4.0)));
        let twice = once.clone().reduce(Action::AddDeliveryTelemetry(reading("A", 4.0)));
        assert_eq!(once, twice);
    }

    #[test]
    fn alerts_are_prepended() {
        let mut a = Alert::new("temp_high");
        a.id = Some(EntityId::Number(1));
        let mut b = Alert::new("vibration_high");
        b.id = Some(EntityId::Number(2));

        let state = DashboardState::default()
            .reduce(Action::AddAlert(a.clone()))
            .reduce(Action::AddAlert(b.clone()));
        assert_eq!(state.alerts, vec![b, a]);
    }

    #[test]
    fn polled_alerts_keep_pushed_ones_in_front() {
        let mut pushed = Alert::new("temp_high");
        pushed.id = Some(EntityId::Number(7));
        let anonymous = Alert::new("vibration_high");
        let mut polled = Alert::new("humidity_high");
        polled.id = Some(EntityId::Number(3));

        let state = DashboardState::default()
            .reduce(Action::AddAlert(pushed.clone()))
            .reduce(Action::AddAlert(anonymous.clone()))
            .reduce(Action::SetAlerts(Vec::new()));
        assert_eq!(state.alerts, vec![anonymous.clone(), pushed.clone()]);

        let state = state.reduce(Action::SetAlerts(vec![polled.clone()]));
        assert_eq!(state.alerts, vec![anonymous.clone(), pushed.clone(), polled.clone()]);

        // the backend now reports the pushed alert itself
        let mut echoed = pushed.clone();
        echoed.message = Some("stored".into());
        let state = state.reduce(Action::SetAlerts(vec![echoed.clone(), polled.clone()]));
        assert_eq!(state.alerts, vec![anonymous, echoed, polled]);
    }

    #[test]
    fn error_flags_round_trip() {
        let state = DashboardState::default().reduce(Action::SetError("boom".into()));
        assert_eq!(state.error.as_deref(), Some("boom"));
        let state = state.reduce(Action::ClearError);
        assert!(state.error.is_none());
    }

    #[test]
    fn series_are_trimmed_to_window() {
        let points = (0..30)
            .rev()
            .map(|i| SeriesPoint {
                timestamp: format!("2024-05-01T10:{:02}:00", i),
                value: i as f64,
                package_id: None,
            })
            .collect();
        let state = DashboardState::new(10).reduce(Action::SetTemperatureSeries(points));
        assert_eq!(state.temperature_series.len(), 10);
        assert_eq!(state.temperature_series[0].value, 20.0);
        assert_eq!(state.temperature_series[9].value, 29.0);
    }

    #[test]
    fn selection_and_connection_flags() {
        let state = DashboardState::default()
            .reduce(Action::SetSelectedDelivery(Some(reading("A", 1.0))))
            .reduce(Action::SetConnected(true))
            .reduce(Action::SetLoading(true));
        assert_eq!(state.selected_delivery.as_ref().map(|d| d.package_id.as_str()), Some("A"));
        assert!(state.connected);
        assert!(state.loading);
    }
}
