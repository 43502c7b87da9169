//! Delivery list and delivery detail (deliveries profile).

use super::thresholds::{Metric, Status, Thresholds};
use crate::domain::TelemetryReading;

pub const LOADING_MESSAGE: &str = "Cargando entregas...";
pub const EMPTY_MESSAGE: &str = "No hay entregas activas";

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRow {
    pub delivery_id: String,
    pub temperature: String,
    pub humidity: String,
    pub vibration: String,
    pub status: Status,
    pub updated: String,
}

pub fn delivery_rows(deliveries: &[TelemetryReading], thresholds: &Thresholds) -> Vec<DeliveryRow> {
    deliveries
        .iter()
        .map(|d| DeliveryRow {
            delivery_id: d.package_id.clone(),
            temperature: format!("{}°C", d.temperature),
            humidity: with_unit(d.humidity, "%"),
            vibration: with_unit(d.g_force, "G"),
            status: thresholds.status(d),
            updated: updated_label(d),
        })
        .collect()
}

/// One metric tile of the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTile {
    pub title: &'static str,
    pub value: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryDetail {
    pub delivery_id: String,
    pub tiles: Vec<MetricTile>,
    pub status: Status,
    pub updated: String,
    pub history_points: usize,
}

/// Detail view of the selected delivery, `None` when nothing is selected.
pub fn delivery_detail(
    selected: Option<&TelemetryReading>,
    history: &[TelemetryReading],
    thresholds: &Thresholds,
) -> Option<DeliveryDetail> {
    let reading = selected?;
    let tiles = vec![
        MetricTile {
            title: "Temperatura",
            value: format!("{}°C", reading.temperature),
            status: thresholds.status_of(Metric::Temperature, Some(reading.temperature)),
        },
        MetricTile {
            title: "Humedad",
            value: with_unit(reading.humidity, "%"),
            status: thresholds.status_of(Metric::Humidity, reading.humidity),
        },
        MetricTile {
            title: "Vibración",
            value: with_unit(reading.g_force, "G"),
            status: thresholds.status_of(Metric::Vibration, reading.g_force),
        },
    ];
    Some(DeliveryDetail {
        delivery_id: reading.package_id.clone(),
        status: thresholds.status(reading),
        tiles,
        updated: updated_label(reading),
        history_points: history.len(),
    })
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{}{}", v, unit),
        None => format!("--{}", unit),
    }
}

fn updated_label(reading: &TelemetryReading) -> String {
    reading
        .recorded_at()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Profile;

    fn delivery(json: &str) -> TelemetryReading {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn rows_carry_status_per_delivery() {
        let thresholds = Profile::Deliveries.thresholds();
        let rows = delivery_rows(
            &[
                delivery(r#"{"part_id":"X1","temp":5,"humidity":60,"vibration":1.0,"ts":"2024-05-01T10:00:00Z"}"#),
                delivery(r#"{"part_id":"X2","temp":7.5}"#),
                delivery(r#"{"part_id":"X3","temp":5,"humidity":90}"#),
            ],
            &thresholds,
        );

        assert_eq!(rows[0].status, Status::Normal);
        assert_eq!(rows[0].humidity, "60%");
        assert_eq!(rows[0].updated, "2024-05-01 10:00:00");
        assert_eq!(rows[1].status, Status::Warning);
        assert_eq!(rows[1].vibration, "--G");
        assert_eq!(rows[2].status, Status::Alert);
    }

    #[test]
    fn detail_flags_each_metric() {
        let thresholds = Profile::Deliveries.thresholds();
        let selected = delivery(r#"{"part_id":"X1","temp":9,"humidity":70,"vibration":2.5}"#);

        let detail = delivery_detail(Some(&selected), &[selected.clone()], &thresholds).unwrap();

        assert_eq!(detail.status, Status::Alert);
        assert_eq!(detail.tiles[0].status, Status::Alert);
        assert_eq!(detail.tiles[1].status, Status::Normal);
        assert_eq!(detail.tiles[2].status, Status::Warning);
        assert_eq!(detail.history_points, 1);
        assert!(delivery_detail(None, &[], &thresholds).is_none());
    }
}
