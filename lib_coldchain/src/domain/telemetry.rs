//! # Telemetry Reading
//!
//! One sensor sample for a package (shipments dashboard) or a part/delivery
//! (deliveries dashboard). Immutable once received.

use super::{parse_timestamp, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Map centre used when a reading carries no coordinates (Madrid).
pub const DEFAULT_LAT: f64 = 40.4168;
/// See [`DEFAULT_LAT`].
pub const DEFAULT_LNG: f64 = -3.7038;

/// A single telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReading {
    /// Row id, when the backend exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Identity of the tracked package or delivery.
    #[serde(alias = "part_id", alias = "package_id")]
    pub package_id: String,
    #[serde(default, alias = "ts", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Degrees Celsius.
    #[serde(alias = "temp")]
    pub temperature: f64,
    /// Vibration / g-force in G.
    #[serde(default, alias = "vibration", alias = "g_force", skip_serializing_if = "Option::is_none")]
    pub g_force: Option<f64>,
    /// Relative humidity in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, alias = "battery_level", skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    /// dBm.
    #[serde(default, alias = "signal_strength", skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
    #[serde(default, alias = "latitude", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude", skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl TelemetryReading {
    /// Creates a reading with only the mandatory fields set.
    pub fn new(package_id: impl Into<String>, temperature: f64) -> Self {
        Self {
            id: None,
            package_id: package_id.into(),
            timestamp: None,
            temperature,
            g_force: None,
            humidity: None,
            battery_level: None,
            signal_strength: None,
            lat: None,
            lng: None,
        }
    }

    /// The reading's timestamp, when present and parseable.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }

    /// Fills missing coordinates with the default map centre.
    pub fn with_default_position(mut self) -> Self {
        self.lat.get_or_insert(DEFAULT_LAT);
        self.lng.get_or_insert(DEFAULT_LNG);
        self
    }

    /// True when `self` should replace `other` as the latest sample of the same
    /// package. Unparseable timestamps compare lexically, missing ones lose.
    pub fn is_newer_than(&self, other: &TelemetryReading) -> bool {
        match (self.recorded_at(), other.recorded_at()) {
            (Some(a), Some(b)) => a > b,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => self.timestamp > other.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_shipments_payload() {
        let raw = r#"{
            "id": 12, "packageId": "PKG-001", "temperature": 24.5, "gForce": 1.2,
            "latitude": 40.1, "longitude": -3.5, "timestamp": "2024-05-01T10:00:00",
            "batteryLevel": 87.4, "signalStrength": -70
        }"#;
        let reading: TelemetryReading = serde_json::from_str(raw).unwrap();
        assert_eq!(reading.package_id, "PKG-001");
        assert_eq!(reading.g_force, Some(1.2));
        assert_eq!(reading.lat, Some(40.1));
        assert_eq!(reading.signal_strength, Some(-70.0));
        assert!(reading.recorded_at().is_some());
    }

    #[test]
    fn accepts_deliveries_payload() {
        let raw = r#"{"part_id": "X1", "ts": "2024-05-01T10:00:00Z", "temp": 5.0, "humidity": 60.0, "vibration": 0.4}"#;
        let reading: TelemetryReading = serde_json::from_str(raw).unwrap();
        assert_eq!(reading.package_id, "X1");
        assert_eq!(reading.temperature, 5.0);
        assert_eq!(reading.g_force, Some(0.4));
        assert_eq!(reading.humidity, Some(60.0));
    }

    #[test]
    fn missing_identity_is_rejected() {
        let err = serde_json::from_str::<TelemetryReading>(r#"{"temp": 5.0}"#).unwrap_err();
        assert!(err.to_string().contains("packageId"));
    }

    #[test]
    fn default_position_only_fills_gaps() {
        let mut reading = TelemetryReading::new("A", 4.0);
        reading.lat = Some(41.0);
        let reading = reading.with_default_position();
        assert_eq!(reading.lat, Some(41.0));
        assert_eq!(reading.lng, Some(DEFAULT_LNG));
    }

    #[test]
    fn newer_sample_wins_by_timestamp() {
        let mut old = TelemetryReading::new("A", 4.0);
        old.timestamp = Some("2024-05-01T10:00:00Z".into());
        let mut new = TelemetryReading::new("A", 5.0);
        new.timestamp = Some("2024-05-01T10:05:00Z".into());
        assert!(new.is_newer_than(&old));
        assert!(!old.is_newer_than(&new));
        assert!(!TelemetryReading::new("A", 1.0).is_newer_than(&old));
    }
}
