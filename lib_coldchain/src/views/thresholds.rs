//! # Status Thresholds
//!
//! The single classification table every view uses. A value strictly above
//! `alert` is an alert, strictly above `warning` a warning, anything else
//! normal. Missing values are normal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::TelemetryReading;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub warning: f64,
    pub alert: f64,
}

impl Limit {
    pub const fn new(warning: f64, alert: f64) -> Self {
        Self { warning, alert }
    }

    pub fn classify(&self, value: f64) -> Status {
        if value > self.alert {
            Status::Alert
        } else if value > self.warning {
            Status::Warning
        } else {
            Status::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// °C
    pub temperature: Limit,
    /// %
    pub humidity: Limit,
    /// G
    pub vibration: Limit,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: Limit::new(25.0, 26.0),
            humidity: Limit::new(75.0, 85.0),
            vibration: Limit::new(2.5, 3.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Normal,
    Warning,
    Alert,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Normal => "NORMAL",
            Status::Warning => "AVISO",
            Status::Alert => "ALERTA",
        }
    }

    /// Colour class used by the renderer.
    pub fn color_class(self) -> &'static str {
        match self {
            Status::Normal => "success",
            Status::Warning => "warning",
            Status::Alert => "danger",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
    Vibration,
}

impl Metric {
    /// Reason shown next to a non-normal status.
    pub fn reason(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperatura Alta",
            Metric::Humidity => "Humedad Alta",
            Metric::Vibration => "Impacto Detectado",
        }
    }
}

/// Status of a reading plus the metrics that caused it, worst first.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status: Status,
    pub reasons: Vec<Metric>,
}

impl Classification {
    /// First reason, or `"Normal"`.
    pub fn headline(&self) -> &'static str {
        self.reasons.first().map(|m| m.reason()).unwrap_or("Normal")
    }
}

impl Thresholds {
    pub fn limit(&self, metric: Metric) -> Limit {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Vibration => self.vibration,
        }
    }

    pub fn status_of(&self, metric: Metric, value: Option<f64>) -> Status {
        value
            .map(|v| self.limit(metric).classify(v))
            .unwrap_or(Status::Normal)
    }

    pub fn classify(&self, reading: &TelemetryReading) -> Classification {
        let mut per_metric: Vec<(Metric, Status)> = [
            (Metric::Temperature, Some(reading.temperature)),
            (Metric::Humidity, reading.humidity),
            (Metric::Vibration, reading.g_force),
        ]
        .into_iter()
        .map(|(metric, value)| (metric, self.status_of(metric, value)))
        .filter(|(_, status)| *status != Status::Normal)
        .collect();

        // stable: ties keep temperature, humidity, vibration order
        per_metric.sort_by(|a, b| b.1.cmp(&a.1));

        Classification {
            status: per_metric.first().map(|(_, s)| *s).unwrap_or(Status::Normal),
            reasons: per_metric.into_iter().map(|(m, _)| m).collect(),
        }
    }

    pub fn status(&self, reading: &TelemetryReading) -> Status {
        self.classify(reading).status
    }

    /// Checks that every warning level sits at or below its alert level.
    pub fn validate(&self) -> Result<(), String> {
        for metric in [Metric::Temperature, Metric::Humidity, Metric::Vibration] {
            let limit = self.limit(metric);
            if !limit.warning.is_finite() || !limit.alert.is_finite() {
                return Err(format!("{:?} thresholds must be finite", metric));
            }
            if limit.warning > limit.alert {
                return Err(format!(
                    "{:?} warning level {} is above alert level {}",
                    metric, limit.warning, limit.alert
                ));
            }
        }
        Ok(())
    }
}
