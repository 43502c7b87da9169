//! Package table: one row per package, built from its newest reading.

use std::collections::BTreeMap;

use super::thresholds::{Status, Thresholds};
use crate::domain::TelemetryReading;

pub const EMPTY_MESSAGE: &str = "No hay datos de envíos disponibles";
pub const LOADING_MESSAGE: &str = "Cargando datos...";

#[derive(Debug, Clone, PartialEq)]
pub struct PackageRow {
    pub package_id: String,
    pub temperature: String,
    pub g_force: String,
    pub battery: String,
    pub signal: String,
    pub status: Status,
    pub reason: &'static str,
    pub updated: String,
}

pub fn package_rows(readings: &[TelemetryReading], thresholds: &Thresholds) -> Vec<PackageRow> {
    latest_per_package(readings)
        .into_values()
        .map(|reading| {
            let classification = thresholds.classify(reading);
            PackageRow {
                package_id: reading.package_id.clone(),
                temperature: format!("{}°C", reading.temperature),
                g_force: format!("{}G", reading.g_force.unwrap_or(0.0)),
                battery: reading
                    .battery_level
                    .map(|b| format!("{}%", b.round()))
                    .unwrap_or_else(|| "--%".to_string()),
                signal: reading
                    .signal_strength
                    .map(|s| format!("{} dBm", s))
                    .unwrap_or_else(|| "-- dBm".to_string()),
                status: classification.status,
                reason: classification.headline(),
                updated: reading
                    .recorded_at()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "--:--:--".to_string()),
            }
        })
        .collect()
}

/// Newest reading per package id, keyed and ordered by id.
pub fn latest_per_package(readings: &[TelemetryReading]) -> BTreeMap<&str, &TelemetryReading> {
    let mut latest: BTreeMap<&str, &TelemetryReading> = BTreeMap::new();
    for reading in readings {
        latest
            .entry(reading.package_id.as_str())
            .and_modify(|current| {
                if reading.is_newer_than(*current) {
                    *current = reading;
                }
            })
            .or_insert(reading);
    }
    latest
}

/// Placeholder text when there are no rows.
pub fn empty_message(loading: bool) -> &'static str {
    if loading {
        LOADING_MESSAGE
    } else {
        EMPTY_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: &str, temp: f64, ts: &str) -> TelemetryReading {
        let mut r = TelemetryReading::new(id, temp);
        r.timestamp = Some(ts.to_string());
        r
    }

    #[test]
    fn newest_reading_wins_per_package() {
        let readings = vec![
            reading("B", 4.0, "2024-05-01T10:00:00Z"),
            reading("A", 24.0, "2024-05-01T10:00:00Z"),
            reading("A", 27.0, "2024-05-01T10:05:00Z"),
            reading("A", 20.0, "2024-05-01T09:00:00Z"),
        ];

        let rows = package_rows(&readings, &Thresholds::default());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].package_id, "A");
        assert_eq!(rows[0].temperature, "27°C");
        assert_eq!(rows[0].status, Status::Alert);
        assert_eq!(rows[0].reason, "Temperatura Alta");
        assert_eq!(rows[0].updated, "10:05:00");
        assert_eq!(rows[1].reason, "Normal");
    }

    #[test]
    fn missing_battery_and_signal_use_placeholders() {
        let mut with = TelemetryReading::new("A", 4.0);
        with.battery_level = Some(86.6);
        with.signal_strength = Some(-70.0);
        let rows = package_rows(&[with, TelemetryReading::new("B", 4.0)], &Thresholds::default());

        assert_eq!(rows[0].battery, "87%");
        assert_eq!(rows[0].signal, "-70 dBm");
        assert_eq!(rows[1].battery, "--%");
        assert_eq!(rows[1].signal, "-- dBm");
        assert_eq!(rows[1].g_force, "0G");
    }

    #[test]
    fn empty_text_depends_on_loading() {
        assert_eq!(empty_message(true), LOADING_MESSAGE);
        assert_eq!(empty_message(false), EMPTY_MESSAGE);
    }
}
