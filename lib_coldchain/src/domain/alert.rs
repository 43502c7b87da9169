//! # Alert
//!
//! Covers both alert shapes: the shipments backend sends
//! `{id, packageId, type, message, timestamp, severity}`, the deliveries backend
//! sends `{part_id, alert_type, alert_value, threshold, ts}`.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Normalised alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// e.g. `temp_high`, `vibration_high`.
    #[serde(rename = "type", alias = "alert_type")]
    pub alert_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, alias = "ts", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, alias = "part_id", skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    /// Observed value that crossed the threshold.
    #[serde(default, alias = "alert_value", skip_serializing_if = "Option::is_none")]
    pub alert_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl Alert {
    pub fn new(alert_type: impl Into<String>) -> Self {
        Self {
            id: None,
            alert_type: alert_type.into(),
            severity: None,
            message: None,
            timestamp: None,
            package_id: None,
            alert_value: None,
            threshold: None,
        }
    }

    pub fn severity_level(&self) -> Severity {
        self.severity
            .as_deref()
            .map(Severity::parse)
            .unwrap_or(Severity::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_alert_shapes() {
        let shipments = r#"{"id": 4, "packageId": "PKG-2", "type": "Temperatura Alta",
            "message": "27.1C", "timestamp": "10:42:00", "severity": "high"}"#;
        let deliveries = r#"{"part_id": "X1", "alert_type": "temp_high", "alert_value": 9.3,
            "threshold": 8.0, "ts": "2024-05-01T10:00:00Z"}"#;

        let a: Alert = serde_json::from_str(shipments).unwrap();
        let b: Alert = serde_json::from_str(deliveries).unwrap();

        assert_eq!(a.id, Some(EntityId::Number(4)));
        assert_eq!(a.severity_level(), Severity::High);
        assert_eq!(b.alert_type, "temp_high");
        assert_eq!(b.package_id.as_deref(), Some("X1"));
        assert_eq!(b.threshold, Some(8.0));
        assert_eq!(b.severity_level(), Severity::Unknown);
    }

    #[test]
    fn serializes_type_field_name() {
        let json = serde_json::to_value(Alert::new("humidity_high")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "humidity_high"}));
    }

    #[test]
    fn severity_parsing_is_case_insensitive() {
        assert_eq!(Severity::parse(" Medium "), Severity::Medium);
        assert_eq!(Severity::parse("LOW"), Severity::Low);
        assert_eq!(Severity::parse("whatever"), Severity::Unknown);
    }
}
