//! # Data Categories and Dashboard Profiles
//!
//! A *category* is one REST endpoint whose payload fills one slot of the store.
//! A *profile* is the set of categories (and default thresholds) one of the two
//! dashboards uses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::views::thresholds::{Limit, Thresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Latest reading per package.
    Telemetry,
    /// Latest reading per delivery; coordinates default to the map centre.
    LatestTelemetry,
    Kpis,
    Alerts,
    ActiveAlerts,
    Locations,
    /// Temperature history series.
    Temperature,
    /// G-force history series.
    GForce,
    ActiveDeliveries,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Telemetry,
        Category::LatestTelemetry,
        Category::Kpis,
        Category::Alerts,
        Category::ActiveAlerts,
        Category::Locations,
        Category::Temperature,
        Category::GForce,
        Category::ActiveDeliveries,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Category::Telemetry => "/api/telemetry",
            Category::LatestTelemetry => "/api/telemetry/latest",
            Category::Kpis => "/api/kpis",
            Category::Alerts => "/api/alerts",
            Category::ActiveAlerts => "/api/alerts/active",
            Category::Locations => "/api/location",
            Category::Temperature => "/api/temperature",
            Category::GForce => "/api/gforce",
            Category::ActiveDeliveries => "/api/deliveries/active",
        }
    }

    /// The store slot this category's payload fills. Two categories with the
    /// same slot overwrite each other.
    pub fn slot(self) -> &'static str {
        match self {
            Category::Telemetry | Category::LatestTelemetry => "telemetry",
            Category::Kpis => "kpis",
            Category::Alerts | Category::ActiveAlerts => "alerts",
            Category::Locations => "locations",
            Category::Temperature => "temperature_series",
            Category::GForce => "gforce_series",
            Category::ActiveDeliveries => "active_deliveries",
        }
    }

    /// Whether the poller may refresh this category. The active delivery list
    /// is loaded on demand so that pushed deliveries are not wiped every tick.
    pub fn is_pollable(self) -> bool {
        self != Category::ActiveDeliveries
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Telemetry => "telemetry",
            Category::LatestTelemetry => "latest_telemetry",
            Category::Kpis => "kpis",
            Category::Alerts => "alerts",
            Category::ActiveAlerts => "active_alerts",
            Category::Locations => "locations",
            Category::Temperature => "temperature",
            Category::GForce => "gforce",
            Category::ActiveDeliveries => "active_deliveries",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Package tracking: KPIs, map, temperature and g-force charts.
    #[default]
    Shipments,
    /// Cold-chain deliveries: latest telemetry and active alerts are polled, the
    /// delivery list is loaded on demand.
    Deliveries,
}

impl Profile {
    pub fn categories(self) -> Vec<Category> {
        match self {
            Profile::Shipments => vec![
                Category::Telemetry,
                Category::Kpis,
                Category::Alerts,
                Category::Locations,
                Category::Temperature,
                Category::GForce,
            ],
            Profile::Deliveries => vec![
                Category::LatestTelemetry,
                Category::ActiveAlerts,
            ],
        }
    }

    pub fn thresholds(self) -> Thresholds {
        match self {
            Profile::Shipments => Thresholds::default(),
            Profile::Deliveries => Thresholds {
                temperature: Limit::new(7.0, 8.0),
                humidity: Limit::new(75.0, 85.0),
                vibration: Limit::new(2.0, 3.0),
            },
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shipments" => Ok(Profile::Shipments),
            "deliveries" => Ok(Profile::Deliveries),
            other => Err(format!("unknown profile '{}' (expected shipments or deliveries)", other)),
        }
    }
}
