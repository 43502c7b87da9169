//! Map markers and viewport.

use super::thresholds::{Metric, Status, Thresholds};
use crate::domain::telemetry::{DEFAULT_LAT, DEFAULT_LNG};
use crate::domain::{LocationPoint, TelemetryReading};

/// Degrees added around the outermost markers.
pub const BOUNDS_PADDING: f64 = 0.1;
pub const LOADING_MESSAGE: &str = "Cargando ubicaciones...";

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: String,
    pub label: String,
    pub lat: f64,
    pub lng: f64,
    pub status: Status,
    pub popup: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl MapBounds {
    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }
}

pub fn markers_from_locations(locations: &[LocationPoint], thresholds: &Thresholds) -> Vec<MapMarker> {
    locations
        .iter()
        .map(|loc| {
            let status = thresholds
                .status_of(Metric::Temperature, loc.temp)
                .max(thresholds.status_of(Metric::Vibration, loc.g_force));
            let label = loc.name.clone().unwrap_or_else(|| loc.id.to_string());
            MapMarker {
                id: loc.id.to_string(),
                popup: popup(&label, loc.temp, loc.g_force),
                label,
                lat: loc.lat,
                lng: loc.lng,
                status,
            }
        })
        .collect()
}

/// Markers for readings that carry coordinates. Readings without a position
/// are skipped.
pub fn markers_from_telemetry(readings: &[TelemetryReading], thresholds: &Thresholds) -> Vec<MapMarker> {
    readings
        .iter()
        .filter_map(|r| {
            let (lat, lng) = (r.lat?, r.lng?);
            Some(MapMarker {
                id: r.package_id.clone(),
                label: r.package_id.clone(),
                lat,
                lng,
                status: thresholds.status(r),
                popup: popup(&r.package_id, Some(r.temperature), r.g_force),
            })
        })
        .collect()
}

/// Bounding box of all markers plus padding, `None` when there are none.
pub fn bounds(markers: &[MapMarker]) -> Option<MapBounds> {
    let first = markers.first()?;
    let init = MapBounds {
        south: first.lat,
        west: first.lng,
        north: first.lat,
        east: first.lng,
    };
    let b = markers.iter().skip(1).fold(init, |b, m| MapBounds {
        south: b.south.min(m.lat),
        west: b.west.min(m.lng),
        north: b.north.max(m.lat),
        east: b.east.max(m.lng),
    });
    Some(MapBounds {
        south: b.south - BOUNDS_PADDING,
        west: b.west - BOUNDS_PADDING,
        north: b.north + BOUNDS_PADDING,
        east: b.east + BOUNDS_PADDING,
    })
}

/// Centre of the markers, or Madrid when there are none.
pub fn center(markers: &[MapMarker]) -> (f64, f64) {
    bounds(markers)
        .map(|b| b.center())
        .unwrap_or((DEFAULT_LAT, DEFAULT_LNG))
}

fn popup(label: &str, temp: Option<f64>, g_force: Option<f64>) -> String {
    let fmt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "--".to_string());
    format!("{} | Temperatura: {}°C | Fuerza G: {}G", label, fmt(temp), fmt(g_force))
}
