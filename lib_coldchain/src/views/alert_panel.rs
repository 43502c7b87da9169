//! Alert panel: newest alerts first, at most five listed, total in the badge.

use crate::domain::{Alert, Severity};

pub const MAX_VISIBLE: usize = 5;
pub const LOADING_MESSAGE: &str = "Cargando alertas...";
pub const EMPTY_MESSAGE: &str = "No hay alertas activas";

#[derive(Debug, Clone, PartialEq)]
pub struct AlertItem {
    pub title: String,
    /// Message, or `"<value> (umbral: <threshold>)"` for threshold alerts.
    pub detail: String,
    pub package_id: String,
    pub timestamp: String,
    pub class: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertPanel {
    pub badge: usize,
    pub items: Vec<AlertItem>,
    /// Shown instead of the list when `items` is empty.
    pub placeholder: Option<&'static str>,
}

pub fn alert_panel(alerts: &[Alert], loading: bool) -> AlertPanel {
    let items: Vec<AlertItem> = alerts.iter().take(MAX_VISIBLE).map(alert_item).collect();
    let placeholder = match (items.is_empty(), loading) {
        (false, _) => None,
        (true, true) => Some(LOADING_MESSAGE),
        (true, false) => Some(EMPTY_MESSAGE),
    };
    AlertPanel {
        badge: alerts.len(),
        items,
        placeholder,
    }
}

fn alert_item(alert: &Alert) -> AlertItem {
    let detail = match (&alert.message, alert.alert_value, alert.threshold) {
        (Some(message), _, _) => message.clone(),
        (None, Some(value), Some(threshold)) => format!("{} (umbral: {})", value, threshold),
        (None, Some(value), None) => value.to_string(),
        _ => String::new(),
    };
    AlertItem {
        title: type_label(&alert.alert_type).to_string(),
        detail,
        package_id: alert.package_id.clone().unwrap_or_default(),
        timestamp: alert.timestamp.clone().unwrap_or_default(),
        class: severity_class(alert),
    }
}

/// Display name of an alert type. Unknown types are shown as received.
pub fn type_label(alert_type: &str) -> &str {
    match alert_type {
        "temp_high" => "Alta Temperatura",
        "humidity_high" => "Alta Humedad",
        "vibration_high" => "Alta Vibración",
        other => other,
    }
}

pub fn severity_class(alert: &Alert) -> &'static str {
    match alert.severity_level() {
        Severity::High => "danger",
        Severity::Medium => "warning",
        Severity::Low => "info",
        Severity::Unknown => "light",
    }
}
