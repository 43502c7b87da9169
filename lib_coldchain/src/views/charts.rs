//! Line-chart view models for the temperature and g-force panels.
//!
//! A chart shows the last `points` samples, oldest first, labelled `HH:MM`
//! (UTC), with the alert level drawn as the critical line.

use super::thresholds::{Metric, Thresholds};
use crate::domain::{parse_timestamp, SeriesPoint, TelemetryReading};

/// Samples shown per chart.
pub const DEFAULT_CHART_POINTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: &'static str,
    pub unit: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub critical: f64,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Indexes of samples above the critical line.
    pub fn breaches(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > self.critical)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

pub fn temperature_chart(points: &[SeriesPoint], thresholds: &Thresholds, limit: usize) -> ChartSeries {
    series_chart("Temperatura", "°C", points, thresholds, Metric::Temperature, limit)
}

pub fn gforce_chart(points: &[SeriesPoint], thresholds: &Thresholds, limit: usize) -> ChartSeries {
    series_chart("Fuerza G", "G", points, thresholds, Metric::Vibration, limit)
}

/// Temperature over a delivery's history. History arrives newest first; the
/// chart is ordered oldest first.
pub fn history_chart(history: &[TelemetryReading], thresholds: &Thresholds, limit: usize) -> ChartSeries {
    let mut ordered: Vec<&TelemetryReading> = history.iter().collect();
    ordered.sort_by_key(|r| r.recorded_at());
    let recent = tail(&ordered, limit);

    ChartSeries {
        title: "Temperatura",
        unit: "°C",
        labels: recent
            .iter()
            .map(|r| time_label(r.timestamp.as_deref()))
            .collect(),
        values: recent.iter().map(|r| r.temperature).collect(),
        critical: thresholds.temperature.alert,
    }
}

fn series_chart(
    title: &'static str,
    unit: &'static str,
    points: &[SeriesPoint],
    thresholds: &Thresholds,
    metric: Metric,
    limit: usize,
) -> ChartSeries {
    let recent = tail(points, limit);
    ChartSeries {
        title,
        unit,
        labels: recent.iter().map(|p| time_label(Some(&p.timestamp))).collect(),
        values: recent.iter().map(|p| p.value).collect(),
        critical: thresholds.limit(metric).alert,
    }
}

fn tail<T>(items: &[T], limit: usize) -> &[T] {
    &items[items.len().saturating_sub(limit)..]
}

fn time_label(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
